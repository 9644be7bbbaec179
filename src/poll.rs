//! Bounded busy-wait
//!
//! The bound is a number of register re-reads, not wall-clock time, so the
//! time spent waiting scales with the core clock.

/// The polled condition was still true after the whole budget was spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expired;

/// Evaluates `busy` until it returns `false`, at most `budget` times
///
/// A budget of zero never evaluates `busy` and always expires.
pub fn wait_while<F>(budget: u32, mut busy: F) -> Result<(), Expired>
where
    F: FnMut() -> bool,
{
    for _ in 0..budget {
        if !busy() {
            return Ok(());
        }
    }

    Err(Expired)
}
