//! Synchronization primitives: semaphore, lock, condition variable
//! (spec.md §3, §4.4).
//!
//! These are plain data types; the blocking/waking behavior that needs
//! access to the thread table, ready set, and current thread lives on
//! [`crate::scheduler::Scheduler`], which owns all three data types and
//! drives them the way the teacher's `Scheduler` drives its `VecDeque`
//! of threads directly. No teacher file has an equivalent — the
//! teacher's only synchronization is the scheduler's own `spin::Mutex` —
//! so this module is built from spec.md, shaped after the wait-list
//! style in `other_examples` twizzler `thread.rs` and the depress/
//! undepress pair in mach_r `priority.rs`.

extern crate alloc;

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::thread::{LockId, Status, ThreadId, ThreadTable};

/// Non-negative counter plus an ordered wait list of blocked threads.
pub struct Semaphore {
    count: i32,
    waiters: Vec<ThreadId>,
}

impl Semaphore {
    pub const fn new(count: i32) -> Semaphore {
        Semaphore {
            count,
            waiters: Vec::new(),
        }
    }

    pub fn waiters(&self) -> &[ThreadId] {
        &self.waiters
    }

    pub(crate) fn push_waiter(&mut self, id: ThreadId) {
        self.waiters.push(id);
    }

    pub(crate) fn take_if_available(&mut self) -> bool {
        if self.count > 0 {
            self.count -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn release_one(&mut self) {
        self.count += 1;
    }

    /// Index of the waiter with the greatest effective priority, ties
    /// broken in favor of the earliest-inserted (lowest index) waiter —
    /// recomputed fresh every call since a waiter's priority may have
    /// been donated up while blocked (spec.md §4.4).
    pub(crate) fn highest_waiter_index(&self, threads: &ThreadTable) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (idx, &id) in self.waiters.iter().enumerate() {
            let prio = threads
                .get(id)
                .map(|t| t.effective_priority())
                .unwrap_or(i32::MIN);
            if best.map_or(true, |(_, best_prio)| prio > best_prio) {
                best = Some((idx, prio));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub(crate) fn remove_waiter_at(&mut self, idx: usize) -> ThreadId {
        self.waiters.remove(idx)
    }
}

static NEXT_LOCK_ID: AtomicU32 = AtomicU32::new(0);

pub fn next_lock_id() -> LockId {
    NEXT_LOCK_ID.fetch_add(1, Ordering::Relaxed)
}

/// A lock: owns an internal binary semaphore and records its holder.
/// Its identity is the `LockId` key it's stored under in
/// `Scheduler.locks`; it does not keep a copy of its own id.
pub struct Lock {
    pub holder: Option<ThreadId>,
    sem: Semaphore,
}

impl Lock {
    pub fn new() -> Lock {
        Lock {
            holder: None,
            sem: Semaphore::new(1),
        }
    }

    pub fn sem(&self) -> &Semaphore {
        &self.sem
    }

    pub fn sem_mut(&mut self) -> &mut Semaphore {
        &mut self.sem
    }

    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }
}

struct CondWaiter {
    thread: ThreadId,
    sem: Semaphore,
}

/// A list of per-waiter one-shot semaphores; signal/broadcast wake the
/// waiter(s) whose associated thread has the highest effective priority.
pub struct CondVar {
    waiters: Vec<CondWaiter>,
}

impl CondVar {
    pub const fn new() -> CondVar {
        CondVar {
            waiters: Vec::new(),
        }
    }

    pub(crate) fn register_waiter(&mut self, thread: ThreadId) {
        self.waiters.push(CondWaiter {
            thread,
            sem: Semaphore::new(0),
        });
    }

    pub(crate) fn highest_priority_waiter(&self, threads: &ThreadTable) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (idx, w) in self.waiters.iter().enumerate() {
            let prio = threads
                .get(w.thread)
                .map(|t| t.effective_priority())
                .unwrap_or(i32::MIN);
            if best.map_or(true, |(_, best_prio)| prio > best_prio) {
                best = Some((idx, prio));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub(crate) fn take_waiter_sem(&mut self, idx: usize) -> Semaphore {
        self.waiters.remove(idx).sem
    }

    pub(crate) fn position_of(&self, thread: ThreadId) -> Option<usize> {
        self.waiters.iter().position(|w| w.thread == thread)
    }

    pub(crate) fn waiter_sem_mut(&mut self, idx: usize) -> &mut Semaphore {
        &mut self.waiters[idx].sem
    }
}

impl Default for CondVar {
    fn default() -> CondVar {
        CondVar::new()
    }
}

/// Status helper used by the scheduler when validating a wait-list
/// transition (spec.md invariant 3): a thread must be BLOCKED while it
/// sits in exactly one wait list.
pub(crate) fn assert_blocked(threads: &ThreadTable, id: ThreadId) {
    let status = threads.get(id).map(|t| t.status);
    assert_eq!(status, Some(Status::Blocked), "waiter not BLOCKED");
}
