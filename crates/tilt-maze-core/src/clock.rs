//! Wall clock shown in the corner of every screen.
//!
//! Counts from power-on; it is independent of the round timer.

use core::{
    cell::Cell,
    fmt,
    sync::atomic::{
        AtomicBool,
        Ordering,
    },
};

use embassy_sync::blocking_mutex::{
    Mutex as BlockingMutex,
    raw::CriticalSectionRawMutex,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl ClockTime {
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    /// One second later, wrapping 23:59:59 to 00:00:00.
    pub fn advance(&mut self) {
        self.seconds += 1;
        if self.seconds >= 60 {
            self.seconds = 0;
            self.minutes += 1;
            if self.minutes >= 60 {
                self.minutes = 0;
                self.hours += 1;
                if self.hours >= 24 {
                    self.hours = 0;
                }
            }
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Clock written by the 1 Hz timer task and read by the renderers.
pub struct SharedClock {
    time: BlockingMutex<CriticalSectionRawMutex, Cell<ClockTime>>,
    dirty: AtomicBool,
}

impl SharedClock {
    pub const fn new() -> Self {
        Self {
            time: BlockingMutex::new(Cell::new(ClockTime::new(0, 0, 0))),
            dirty: AtomicBool::new(false),
        }
    }

    /// Advances by one second and flags the overlay for redraw.
    pub fn tick(&self) {
        self.time.lock(|t| {
            let mut now = t.get();
            now.advance();
            t.set(now);
        });
        self.dirty.store(true, Ordering::Release);
    }

    pub fn now(&self) -> ClockTime {
        self.time.lock(Cell::get)
    }

    /// Returns whether a redraw is pending and clears the flag.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_roll_into_minutes() {
        let mut t = ClockTime::new(0, 0, 59);
        t.advance();
        assert_eq!(t, ClockTime::new(0, 1, 0));
    }

    #[test]
    fn minutes_roll_into_hours() {
        let mut t = ClockTime::new(4, 59, 59);
        t.advance();
        assert_eq!(t, ClockTime::new(5, 0, 0));
    }

    #[test]
    fn end_of_day_wraps_to_midnight() {
        let mut t = ClockTime::new(23, 59, 59);
        t.advance();
        assert_eq!(t, ClockTime::new(0, 0, 0));
    }

    #[test]
    fn full_day_returns_to_start() {
        let mut t = ClockTime::new(13, 7, 42);
        for _ in 0..24 * 60 * 60 {
            t.advance();
            assert!(t.seconds < 60 && t.minutes < 60 && t.hours < 24);
        }
        assert_eq!(t, ClockTime::new(13, 7, 42));
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(ClockTime::new(3, 4, 5).to_string(), "03:04:05");
    }

    #[test]
    fn tick_sets_dirty_once() {
        let clock = SharedClock::new();
        assert!(!clock.take_dirty());
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), ClockTime::new(0, 0, 2));
        assert!(clock.take_dirty());
        assert!(!clock.take_dirty());
    }
}
