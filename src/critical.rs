//! Interrupt-disable discipline: the sole mutual-exclusion primitive
//! protecting scheduler state (spec.md §5).
//!
//! Grounded on the teacher's repeated
//! `x86_64::instructions::interrupts::without_interrupts(|| ...)` call
//! sites in `task/scheduler.rs`, `task/process.rs`, and
//! `task/executor.rs`. On real x86_64 hardware this masks interrupts for
//! the duration of the closure; under `cfg(test)` (and on any other
//! target) there is no interrupt flag to mask, so it degrades to a
//! reentrant no-op — test code is single-threaded and never preempted
//! mid-closure.

#[cfg(all(target_arch = "x86_64", not(test)))]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    x86_64::instructions::interrupts::without_interrupts(f)
}

#[cfg(not(all(target_arch = "x86_64", not(test))))]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_return_value_passes_through() {
        let v = without_interrupts(|| 1 + 1);
        assert_eq!(v, 2);
    }
}
