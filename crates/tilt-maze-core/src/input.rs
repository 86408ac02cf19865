//! Button edge detection.
//!
//! The input task samples the button at a fixed period; debouncing comes only
//! from that period, so a bouncy contact slower than it can still register
//! twice.

use core::sync::atomic::{
    AtomicBool,
    Ordering,
};

/// Reports low-to-high transitions of a sampled level.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    prev: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { prev: false }
    }

    /// Feeds one sample; `true` exactly on a rising edge.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.prev;
        self.prev = level;
        rising
    }
}

/// One-shot "pressed" flag set by the input task and consumed by the game.
#[derive(Debug, Default)]
pub struct PressLatch(AtomicBool);

impl PressLatch {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether a press was latched and clears it.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_level_is_one_edge() {
        let mut edge = EdgeDetector::new();
        let levels = [false, true, true, true, false, false, true];
        let edges: Vec<bool> = levels.iter().map(|&l| edge.update(l)).collect();
        assert_eq!(edges, [false, true, false, false, false, false, true]);
    }

    #[test]
    fn starting_high_counts_as_press() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true));
    }

    #[test]
    fn latch_is_consumed_once() {
        let latch = PressLatch::new();
        assert!(!latch.take());
        latch.set();
        latch.set();
        assert!(latch.take());
        assert!(!latch.take());
    }
}
