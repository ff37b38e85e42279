// Quickesc Timer Primitives
// Free-running millisecond counters with wraparound-safe elapsed time

use std::cell::Cell;
use std::fmt;

/// A reading of a free-running millisecond counter.
///
/// Counters wrap at their width, so elapsed time is computed with modular
/// subtraction. Gaps longer than one full counter period alias.
pub trait Tick: Copy + Eq + fmt::Debug {
    /// Milliseconds from `earlier` to `self`, modulo the counter width
    fn elapsed_since(self, earlier: Self) -> u32;

    /// This reading advanced by `ms`, wrapping at the counter width
    fn wrapping_add_ms(self, ms: u32) -> Self;

    /// Counter value at absolute time `ms` (truncated to the counter width)
    fn from_millis(ms: u64) -> Self;
}

impl Tick for u16 {
    fn elapsed_since(self, earlier: Self) -> u32 {
        u32::from(self.wrapping_sub(earlier))
    }

    fn wrapping_add_ms(self, ms: u32) -> Self {
        self.wrapping_add(ms as u16)
    }

    fn from_millis(ms: u64) -> Self {
        ms as u16
    }
}

impl Tick for u32 {
    fn elapsed_since(self, earlier: Self) -> u32 {
        self.wrapping_sub(earlier)
    }

    fn wrapping_add_ms(self, ms: u32) -> Self {
        self.wrapping_add(ms)
    }

    fn from_millis(ms: u64) -> Self {
        ms as u32
    }
}

/// Source of the current counter value (the firmware's `timer_read`)
pub trait Clock {
    type Tick: Tick;

    /// Current counter value
    fn now(&self) -> Self::Tick;
}

/// Manually driven clock for simulation and tests
#[derive(Debug, Clone)]
pub struct ManualClock<T: Tick> {
    now: Cell<T>,
}

impl<T: Tick> ManualClock<T> {
    /// Create a clock reading `start`
    pub fn new(start: T) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Create a clock positioned at absolute time `ms`
    pub fn at_millis(ms: u64) -> Self {
        Self::new(T::from_millis(ms))
    }

    /// Move the clock forward by `ms`
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add_ms(ms));
    }

    /// Jump to absolute time `ms`
    pub fn set_millis(&self, ms: u64) {
        self.now.set(T::from_millis(ms));
    }
}

impl<T: Tick> Clock for ManualClock<T> {
    type Tick = T;

    fn now(&self) -> T {
        self.now.get()
    }
}
