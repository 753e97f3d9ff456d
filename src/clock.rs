//! Wall-clock sources for mode timers
//!
//! Sessions never read the time directly; they ask the `Clock` they were
//! started with. Hosts use `SystemClock`, tests and fixed-step drivers use
//! `ManualClock`.

use std::cell::Cell;
use std::rc::Rc;

/// A monotonic source of seconds
pub trait Clock {
    /// Current time in seconds (arbitrary epoch, never decreases)
    fn now_secs(&self) -> f64;
}

/// Real wall clock
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Real wall clock (browser `Date.now()`)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

#[cfg(target_arch = "wasm32")]
impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        js_sys::Date::now() / 1000.0
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Manually advanced clock, shared between clones
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move time forward by `secs` (negative values are ignored)
    pub fn advance(&self, secs: f64) {
        if secs > 0.0 {
            self.now.set(self.now.get() + secs);
        }
    }

    /// Jump to an absolute time, never backwards
    pub fn set(&self, secs: f64) {
        if secs > self.now.get() {
            self.now.set(secs);
        }
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(10.0);
        let other = clock.clone();
        clock.advance(2.5);
        assert_eq!(other.now_secs(), 12.5);
    }

    #[test]
    fn test_manual_clock_never_goes_backwards() {
        let clock = ManualClock::new(5.0);
        clock.advance(-1.0);
        clock.set(3.0);
        assert_eq!(clock.now_secs(), 5.0);
        clock.set(7.0);
        assert_eq!(clock.now_secs(), 7.0);
    }
}
