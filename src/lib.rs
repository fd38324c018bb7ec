//! Preemptive kernel thread scheduler core: alarm/sleep, strict priority
//! with donation, and MLFQS (see `SPEC_FULL.md`).
//!
//! The scheduler core (`scheduler::Scheduler`) is a plain instantiable
//! value so unit tests can each start from a clean one. This module adds
//! the teacher's `static SCHEDULER: Mutex<Option<Scheduler>>` convenience
//! layer on top of it (`task::scheduler::SCHEDULER`/`init`/`try_schedule`
//! in the reference repo) so an embedding kernel gets the same "one
//! scheduler, call free functions from anywhere" shape it's used to,
//! without losing the testable instance underneath.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod context;
pub mod critical;
pub mod donation;
pub mod fixed_point;
pub mod ready_set;
pub mod scheduler;
pub mod serial;
pub mod sleep_set;
pub mod sync;
pub mod thread;

use alloc::boxed::Box;
use alloc::string::String;
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;

use config::SchedulerConfig;
use context::{StackProvider, Switcher};
use scheduler::{Scheduler, Stats};
use sync::CondVar;
use thread::{LockId, Thread, ThreadId};

pub static SCHEDULER: Mutex<Option<Scheduler>> = Mutex::new(None);
static SCHEDULER_ENABLED: AtomicBool = AtomicBool::new(false);

/// Bring up the global scheduler. Call once, before any thread is
/// created or any other function in this module is used.
pub fn init(config: SchedulerConfig, switcher: Box<dyn Switcher>, stack_provider: Box<dyn StackProvider>) {
    *SCHEDULER.lock() = Some(Scheduler::new(config, switcher, stack_provider));
    SCHEDULER_ENABLED.store(true, Ordering::Release);
    serial_println!("scheduler core initialized");
}

pub fn is_enabled() -> bool {
    SCHEDULER_ENABLED.load(Ordering::Acquire)
}

fn with_scheduler<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    let mut guard = SCHEDULER.lock();
    let sched = guard.as_mut().expect("scheduler core not initialized");
    f(sched)
}

// ---- public scheduler API (spec.md §6) -------------------------------

pub fn create(name: String, priority: i32, entry: fn(u64), arg: u64) -> ThreadId {
    with_scheduler(|s| s.create(name, priority, entry, arg))
}

pub fn exit() {
    with_scheduler(|s| s.exit())
}

pub fn yield_now() {
    with_scheduler(|s| s.yield_now())
}

pub fn block() {
    with_scheduler(|s| s.block())
}

pub fn unblock(id: ThreadId) {
    with_scheduler(|s| s.unblock(id))
}

pub fn current() -> Option<ThreadId> {
    with_scheduler(|s| s.current())
}

pub fn tid() -> ThreadId {
    with_scheduler(|s| s.tid())
}

pub fn name(id: ThreadId) -> Option<String> {
    with_scheduler(|s| s.name(id))
}

pub fn foreach(f: impl FnMut(&Thread)) {
    with_scheduler(|s| s.foreach(f))
}

pub fn get_priority() -> i32 {
    with_scheduler(|s| s.get_priority())
}

pub fn set_priority(new: i32) {
    with_scheduler(|s| s.set_priority(new))
}

pub fn get_nice() -> i32 {
    with_scheduler(|s| s.get_nice())
}

pub fn set_nice(nice: i32) {
    with_scheduler(|s| s.set_nice(nice))
}

pub fn sleep(ticks: u64) {
    with_scheduler(|s| s.sleep(ticks))
}

pub fn wake(now: u64) -> u64 {
    with_scheduler(|s| s.wake(now))
}

/// Called from the timer ISR with interrupts already disabled. Returns
/// whether the caller should yield on return from the interrupt; never
/// switches inside the handler itself (spec.md §6).
pub fn tick() -> bool {
    with_scheduler(|s| s.tick())
}

pub fn lock_create() -> LockId {
    with_scheduler(|s| s.lock_create())
}

pub fn lock_acquire(lock_id: LockId) {
    with_scheduler(|s| s.lock_acquire(lock_id))
}

pub fn lock_release(lock_id: LockId) {
    with_scheduler(|s| s.lock_release(lock_id))
}

pub fn condvar_wait(cv: &mut CondVar, lock_id: LockId) {
    with_scheduler(|s| s.condvar_wait(cv, lock_id))
}

pub fn condvar_signal(cv: &mut CondVar) {
    with_scheduler(|s| s.condvar_signal(cv))
}

pub fn condvar_broadcast(cv: &mut CondVar) {
    with_scheduler(|s| s.condvar_broadcast(cv))
}

pub fn stats() -> Stats {
    with_scheduler(|s| s.stats())
}

pub fn print_stats() {
    with_scheduler(|s| s.print_stats())
}

pub fn get_load_avg() -> i32 {
    with_scheduler(|s| s.get_load_avg())
}

pub fn get_recent_cpu() -> i32 {
    with_scheduler(|s| s.get_recent_cpu())
}

// Re-exported so an embedder can build a `Lock`/`CondVar` or hold a
// `ThreadId` without reaching into the submodules directly.
pub use sync::Lock;
pub use thread::{PRI_MAX, PRI_MIN, TID_ERROR};
