//! Priority donation engine (spec.md §4.4, §4.7).
//!
//! No teacher file has an equivalent — the teacher's scheduler is
//! strict round-robin with no locks — so this is built from spec.md in
//! the idiom of `other_examples` mach_r `priority.rs`'s
//! `PriorityInfo::effective_priority`/`depress`/`undepress` pair,
//! generalized from a single depression level to a transitive chain walk
//! bounded the way spec.md §4.4 bounds it.

extern crate alloc;

use alloc::collections::BTreeMap;

use crate::sync::Lock;
use crate::thread::{LockId, ThreadId, ThreadTable, NO_DONATION};

/// Chains longer than this are treated as the end of the line rather
/// than walked further, so a cyclic or malformed `awaiting_lock` graph
/// can never spin the scheduler.
pub const MAX_CHAIN_HOPS: usize = 8;

/// Raise priorities along the chain of lock holders blocking `donor`,
/// starting at `first_holder` (the current holder of the lock `donor`
/// is about to wait on). Spec.md §4.4 step: "the engine raises the
/// holder's donated priority ... and, if the holder is itself blocked
/// waiting on another lock, repeats this for that lock's holder,
/// continuing transitively".
pub fn propagate(
    threads: &mut ThreadTable,
    locks: &BTreeMap<LockId, Lock>,
    donor: ThreadId,
    first_holder: ThreadId,
) {
    let donor_priority = match threads.get(donor) {
        Some(t) => t.effective_priority(),
        None => return,
    };

    let mut holder = first_holder;
    for _ in 0..MAX_CHAIN_HOPS {
        let current_effective = match threads.get(holder) {
            Some(t) => t.effective_priority(),
            None => break,
        };
        if donor_priority > current_effective {
            if let Some(t) = threads.get_mut(holder) {
                t.donated_priority = donor_priority;
            }
        }

        let next_lock = match threads.get(holder).and_then(|t| t.awaiting_lock) {
            Some(l) => l,
            None => break,
        };
        let next_holder = match locks.get(&next_lock).and_then(|l| l.holder) {
            Some(h) => h,
            None => break,
        };
        if next_holder == holder {
            break;
        }
        holder = next_holder;
    }
}

/// Recompute `thread`'s donated priority from the waiters of every lock
/// it still holds, rather than simply lowering it — spec.md §4.7: "on
/// release, the lock's former holder's donated priority is recomputed
/// from scratch ... not merely decremented," since it may still be
/// propped up by a different lock it also holds.
pub fn recompute_donated(threads: &mut ThreadTable, thread: ThreadId, locks: &BTreeMap<LockId, Lock>) {
    let (held, base) = match threads.get(thread) {
        Some(t) => (t.locks_held.clone(), t.base_priority),
        None => return,
    };

    let mut max_donation = NO_DONATION;
    for lock_id in held {
        if let Some(lock) = locks.get(&lock_id) {
            for &waiter in lock.sem().waiters() {
                if let Some(t) = threads.get(waiter) {
                    max_donation = core::cmp::max(max_donation, t.effective_priority());
                }
            }
        }
    }

    // Invariant 4 (spec.md §3): donated_priority >= base_priority whenever
    // non-negative. A remaining waiter with priority below base would
    // otherwise leave a stale, sub-base donation in place.
    if max_donation <= base {
        max_donation = NO_DONATION;
    }

    if let Some(t) = threads.get_mut(thread) {
        t.donated_priority = max_donation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::{next_thread_id, Thread};
    use alloc::string::String;

    fn make(table: &mut ThreadTable, prio: i32) -> ThreadId {
        let id = next_thread_id();
        table.insert(Thread::new(id, String::from("t"), prio));
        id
    }

    #[test]
    fn propagate_raises_single_holder() {
        let mut table = ThreadTable::new();
        let locks: BTreeMap<LockId, Lock> = BTreeMap::new();
        let low = make(&mut table, 10);
        let high = make(&mut table, 50);

        propagate(&mut table, &locks, high, low);
        assert_eq!(table.get(low).unwrap().effective_priority(), 50);
    }

    #[test]
    fn propagate_never_lowers_priority() {
        let mut table = ThreadTable::new();
        let locks: BTreeMap<LockId, Lock> = BTreeMap::new();
        let low_donor = make(&mut table, 5);
        let high_holder = make(&mut table, 60);

        propagate(&mut table, &locks, low_donor, high_holder);
        assert_eq!(table.get(high_holder).unwrap().effective_priority(), 60);
    }

    #[test]
    fn propagate_walks_transitive_chain() {
        let mut table = ThreadTable::new();
        let mut locks: BTreeMap<LockId, Lock> = BTreeMap::new();

        let a = make(&mut table, 10); // holds lock 1, waits on nothing
        let b = make(&mut table, 20); // holds lock 2, waits on lock 1
        let donor = make(&mut table, 63);

        let mut lock1 = Lock::new();
        lock1.holder = Some(a);
        locks.insert(1, lock1);

        let mut lock2 = Lock::new();
        lock2.holder = Some(b);
        locks.insert(2, lock2);

        table.get_mut(b).unwrap().awaiting_lock = Some(1);

        // donor blocks on lock 2, held by b, who is itself blocked on lock 1 held by a
        propagate(&mut table, &locks, donor, b);
        assert_eq!(table.get(b).unwrap().effective_priority(), 63);
        assert_eq!(table.get(a).unwrap().effective_priority(), 63);
    }

    #[test]
    fn recompute_donated_falls_back_to_no_donation() {
        let mut table = ThreadTable::new();
        let locks: BTreeMap<LockId, Lock> = BTreeMap::new();
        let holder = make(&mut table, 10);
        table.get_mut(holder).unwrap().donated_priority = 50;

        recompute_donated(&mut table, holder, &locks);
        assert_eq!(table.get(holder).unwrap().donated_priority, NO_DONATION);
    }

    #[test]
    fn recompute_donated_keeps_max_of_remaining_waiters() {
        let mut table = ThreadTable::new();
        let mut locks: BTreeMap<LockId, Lock> = BTreeMap::new();
        let holder = make(&mut table, 10);
        let waiter_a = make(&mut table, 30);
        let waiter_b = make(&mut table, 45);

        let mut lock = Lock::new();
        lock.holder = Some(holder);
        lock.sem_mut().push_waiter(waiter_a);
        lock.sem_mut().push_waiter(waiter_b);
        locks.insert(7, lock);
        table.get_mut(holder).unwrap().locks_held.push(7);

        recompute_donated(&mut table, holder, &locks);
        assert_eq!(table.get(holder).unwrap().donated_priority, 45);
    }
}
