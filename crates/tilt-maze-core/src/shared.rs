//! The context shared by all tasks.
//!
//! Created once as a `static` before the executors start. Every field has a
//! single writer:
//!
//! | field | writer | readers |
//! | --- | --- | --- |
//! | `samples` | sensor sampler | game logic |
//! | `view` | game logic | renderer |
//! | `clock` | clock timer | clock renderer, renderer |
//! | `button` | input sampler | game logic |
//!
//! The display is not in here: it lives behind a [`DisplayLock`] owned by the
//! core that drives the panel.

use core::cell::Cell;

use embassy_sync::{
    blocking_mutex::{
        Mutex as BlockingMutex,
        raw::CriticalSectionRawMutex,
    },
    channel::Channel,
    mutex::Mutex,
};

use crate::{
    clock::SharedClock,
    config::QUEUE_DEPTH,
    game::TickInputs,
    input::PressLatch,
    sample::InertialSample,
    state::GameState,
};

/// Display device guarded for the two drawing tasks.
pub type DisplayLock<D> = Mutex<CriticalSectionRawMutex, D>;

/// What the renderer needs from the game, published after every logic tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub state: GameState,
    /// Index into [`crate::maze::MAPS`].
    pub map: usize,
    pub ball_x: f32,
    pub ball_y: f32,
    pub lives: u8,
    pub game_time_ms: u32,
    pub best_time_ms: Option<u32>,
}

impl Snapshot {
    pub const fn initial() -> Self {
        Self {
            state: GameState::Init,
            map: 0,
            ball_x: 0.0,
            ball_y: 0.0,
            lives: 0,
            game_time_ms: 0,
            best_time_ms: None,
        }
    }
}

/// Outcome of offering a sample to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    Queued,
    /// The queue was full; the sample is gone.
    Dropped,
}

pub struct Shared {
    samples: Channel<CriticalSectionRawMutex, InertialSample, QUEUE_DEPTH>,
    view: BlockingMutex<CriticalSectionRawMutex, Cell<Snapshot>>,
    pub clock: SharedClock,
    pub button: PressLatch,
}

impl Shared {
    pub const fn new() -> Self {
        Self {
            samples: Channel::new(),
            view: BlockingMutex::new(Cell::new(Snapshot::initial())),
            clock: SharedClock::new(),
            button: PressLatch::new(),
        }
    }

    /// Non-blocking enqueue. A full queue keeps its contents; the new sample
    /// is dropped.
    pub fn offer_sample(&self, sample: InertialSample) -> Delivery {
        match self.samples.try_send(sample) {
            Ok(()) => Delivery::Queued,
            Err(_) => Delivery::Dropped,
        }
    }

    /// Oldest queued sample, if any. Never waits.
    pub fn take_sample(&self) -> Option<InertialSample> {
        self.samples.try_receive().ok()
    }

    pub fn queued_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.view.lock(|v| v.set(snapshot));
    }

    pub fn snapshot(&self) -> Snapshot {
        self.view.lock(Cell::get)
    }
}

impl Default for Shared {
    fn default() -> Self {
        Self::new()
    }
}

impl TickInputs for &Shared {
    fn next_sample(&mut self) -> Option<InertialSample> {
        self.take_sample()
    }

    fn take_press(&mut self) -> bool {
        self.button.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: i16) -> InertialSample {
        InertialSample {
            ax: n,
            ..Default::default()
        }
    }

    #[test]
    fn full_queue_drops_new_sample_and_keeps_contents() {
        let shared = Shared::new();
        for n in 0..QUEUE_DEPTH as i16 {
            assert_eq!(shared.offer_sample(sample(n)), Delivery::Queued);
        }
        assert_eq!(shared.offer_sample(sample(99)), Delivery::Dropped);
        assert_eq!(shared.queued_samples(), QUEUE_DEPTH);

        for n in 0..QUEUE_DEPTH as i16 {
            assert_eq!(shared.take_sample(), Some(sample(n)));
        }
        assert_eq!(shared.take_sample(), None);
    }

    #[test]
    fn snapshot_reads_latest_publish() {
        let shared = Shared::new();
        assert_eq!(shared.snapshot(), Snapshot::initial());
        let snap = Snapshot {
            state: GameState::Playing,
            lives: 2,
            ..Snapshot::initial()
        };
        shared.publish(snap);
        assert_eq!(shared.snapshot(), snap);
    }
}
