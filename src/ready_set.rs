//! Ready set: container of runnable threads, max-effective-priority
//! extractable, FIFO among ties.
//!
//! Grounded on the teacher's `Scheduler.threads: VecDeque<Thread>` plus
//! its linear "pick first Ready thread" scan in `schedule()`; here the
//! scan is made explicit as `pop_max` and insertion order is tracked so
//! ties break in favor of the thread that became ready first (spec.md
//! §4.2, §8 scenario 6).

extern crate alloc;

use alloc::collections::VecDeque;

use crate::thread::{Thread, ThreadId, ThreadTable};

/// Sequence number assigned at insertion, used only to break priority
/// ties in FIFO order.
type Seq = u64;

struct Entry {
    id: ThreadId,
    seq: Seq,
}

pub struct ReadySet {
    entries: VecDeque<Entry>,
    next_seq: Seq,
}

impl ReadySet {
    pub const fn new() -> ReadySet {
        ReadySet {
            entries: VecDeque::new(),
            next_seq: 0,
        }
    }

    pub fn insert(&mut self, id: ThreadId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(Entry { id, seq });
    }

    pub fn remove(&mut self, id: ThreadId) -> bool {
        if let Some(pos) = self.entries.iter().position(|e| e.id == id) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove and return the thread with the greatest effective priority.
    /// Ties go to the entry with the smaller sequence number (older).
    pub fn pop_max(&mut self, table: &ThreadTable) -> Option<ThreadId> {
        let mut best: Option<(usize, i32, Seq)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            let prio = table
                .get(entry.id)
                .map(Thread::effective_priority)
                .unwrap_or(i32::MIN);
            let better = match best {
                None => true,
                Some((_, best_prio, best_seq)) => {
                    prio > best_prio || (prio == best_prio && entry.seq < best_seq)
                }
            };
            if better {
                best = Some((idx, prio, entry.seq));
            }
        }
        best.map(|(idx, _, _)| self.entries.remove(idx).unwrap().id)
    }

    /// Peek the max without removing it (used by preemption checks).
    pub fn peek_max_priority(&self, table: &ThreadTable) -> Option<i32> {
        self.entries
            .iter()
            .filter_map(|e| table.get(e.id).map(Thread::effective_priority))
            .max()
    }

    /// Re-sort is a no-op for this representation: `pop_max` always
    /// recomputes priorities from the thread table, so an en-masse
    /// priority rewrite (MLFQS) needs no separate bookkeeping pass here.
    /// Kept as an explicit call site per spec.md §4.2 so callers don't
    /// need to know that detail.
    pub fn resort_all(&mut self, _table: &ThreadTable) {}

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
