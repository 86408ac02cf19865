//! Bodies of the periodic tasks.
//!
//! Each loop runs on an [`embassy_time::Ticker`], so the next wake-up is
//! computed from the previous deadline rather than from when the work
//! finished. The one-step helpers next to each loop hold the actual logic
//! and are what the tests drive.
//!
//! | task | period | lock wait |
//! | --- | --- | --- |
//! | [`sensor_sampler`] | 33 ms | - |
//! | [`game_logic`] | 33 ms | - |
//! | [`renderer`] | 100 ms | 100 ms |
//! | [`input_sampler`] | 100 ms | - |
//! | [`clock_timer`] | 1 s | - |
//! | [`clock_renderer`] | 1 s | 50 ms |

use embassy_time::{
    Duration,
    Instant,
    Ticker,
    Timer,
    with_timeout,
};
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::DrawTarget,
};
use embedded_hal::digital::InputPin;

use crate::{
    clock::SharedClock,
    config::{
        Geometry,
        Timing,
    },
    game::{
        Game,
        Tick,
    },
    input::{
        EdgeDetector,
        PressLatch,
    },
    render::{
        self,
        Renderer,
    },
    sample::{
        Calibration,
        Calibrator,
        InertialSensor,
    },
    shared::{
        Delivery,
        DisplayLock,
        Shared,
    },
};

/// One read-and-enqueue. `None` when the read failed.
pub fn sample_once<S: InertialSensor>(sensor: &mut S, shared: &Shared) -> Option<Delivery> {
    match sensor.read() {
        Ok(sample) => {
            let delivery = shared.offer_sample(sample);
            if delivery == Delivery::Dropped {
                trace!("sample queue full, dropped");
            }
            Some(delivery)
        }
        Err(_) => {
            debug!("sensor read failed");
            None
        }
    }
}

pub async fn sensor_sampler<S: InertialSensor>(sensor: &mut S, shared: &Shared, period: Duration) -> ! {
    info!("sensor sampler running");
    let mut ticker = Ticker::every(period);
    loop {
        sample_once(sensor, shared);
        ticker.next().await;
    }
}

/// Advances the game at `now_ms` and publishes the result.
pub fn logic_step(game: &mut Game, shared: &Shared, now_ms: u64) -> Tick {
    let mut inputs = shared;
    let tick = game.tick(now_ms, &mut inputs);
    shared.publish(game.snapshot());
    tick
}

/// Sits out a [`Tick::Hold`] without blocking other tasks, then resumes the
/// game and restarts `ticker` so no missed periods are replayed.
///
/// Returns the resume time in ms.
pub async fn hold_then_resume(game: &mut Game, shared: &Shared, hold: Duration, ticker: &mut Ticker) -> u64 {
    Timer::after(hold).await;
    let now_ms = Instant::now().as_millis();
    game.resume(now_ms);
    shared.publish(game.snapshot());
    ticker.reset();
    now_ms
}

pub async fn game_logic(game: &mut Game, shared: &Shared, period: Duration) -> ! {
    info!("game logic running");
    let mut ticker = Ticker::every(period);
    loop {
        if let Tick::Hold(hold) = logic_step(game, shared, Instant::now().as_millis()) {
            hold_then_resume(game, shared, hold, &mut ticker).await;
        }
        ticker.next().await;
    }
}

/// Draws one frame if the display can be had within `timeout`.
///
/// Returns whether a frame was attempted.
pub async fn render_once<D>(
    display: &DisplayLock<D>,
    shared: &Shared,
    renderer: &mut Renderer,
    timeout: Duration,
) -> bool
where
    D: DrawTarget<Color = Rgb565>,
{
    let Ok(mut panel) = with_timeout(timeout, display.lock()).await else {
        return false;
    };
    let snap = shared.snapshot();
    let clock = shared.clock.now();
    if renderer.render(&mut *panel, &snap, &clock).is_err() {
        warn!("frame draw failed");
        renderer.invalidate();
    }
    true
}

pub async fn renderer<D>(display: &DisplayLock<D>, shared: &Shared, geo: Geometry, timing: Timing) -> !
where
    D: DrawTarget<Color = Rgb565>,
{
    info!("renderer running");
    let mut renderer = Renderer::new(geo);
    let mut ticker = Ticker::every(timing.render_period);
    loop {
        render_once(display, shared, &mut renderer, timing.render_lock_timeout).await;
        ticker.next().await;
    }
}

/// Samples the button once; latches a press on a rising edge.
pub fn poll_button<P: InputPin>(pin: &mut P, edge: &mut EdgeDetector, latch: &PressLatch) -> bool {
    // A pin that cannot be read counts as released.
    let level = pin.is_high().unwrap_or(false);
    let pressed = edge.update(level);
    if pressed {
        latch.set();
        info!("button pressed");
    }
    pressed
}

pub async fn input_sampler<P: InputPin>(pin: &mut P, latch: &PressLatch, period: Duration) -> ! {
    info!("input sampler running");
    let mut edge = EdgeDetector::new();
    let mut ticker = Ticker::every(period);
    loop {
        poll_button(pin, &mut edge, latch);
        ticker.next().await;
    }
}

pub async fn clock_timer(clock: &SharedClock, period: Duration) -> ! {
    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        clock.tick();
    }
}

/// Redraws the clock overlay if the timer flagged a change.
///
/// The flag is cleared before the lock is tried, so a timed-out attempt waits
/// for the next second.
pub async fn clock_overlay_once<D>(
    display: &DisplayLock<D>,
    clock: &SharedClock,
    geo: &Geometry,
    timeout: Duration,
) -> bool
where
    D: DrawTarget<Color = Rgb565>,
{
    if !clock.take_dirty() {
        return false;
    }
    let Ok(mut panel) = with_timeout(timeout, display.lock()).await else {
        return false;
    };
    if render::draw_clock(&mut *panel, geo, &clock.now()).is_err() {
        debug!("clock draw failed");
    }
    true
}

pub async fn clock_renderer<D>(display: &DisplayLock<D>, clock: &SharedClock, geo: Geometry, timing: Timing) -> !
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut ticker = Ticker::every(timing.clock_render_period);
    loop {
        ticker.next().await;
        clock_overlay_once(display, clock, &geo, timing.clock_lock_timeout).await;
    }
}

/// Averages level readings taken `interval` apart. Failed reads are skipped.
pub async fn calibrate<S: InertialSensor>(sensor: &mut S, samples: u16, interval: Duration) -> Calibration {
    let mut acc = Calibrator::new();
    for _ in 0..samples {
        if let Ok(sample) = sensor.read() {
            acc.add(&sample);
        }
        Timer::after(interval).await;
    }
    let calibration = acc.finish();
    info!(
        "calibrated from {}/{} reads: x={} y={}",
        acc.count(),
        samples,
        calibration.offset_x,
        calibration.offset_y
    );
    calibration
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embassy_futures::block_on;
    use embedded_graphics::prelude::*;

    use super::*;
    use crate::{
        config::{
            Config,
            QUEUE_DEPTH,
        },
        sample::InertialSample,
        state::GameState,
    };

    /// Sensor returning a fixed script of results.
    struct Scripted {
        results: Vec<Result<InertialSample, ()>>,
    }

    impl InertialSensor for Scripted {
        type Error = ();

        fn read(&mut self) -> Result<InertialSample, ()> {
            if self.results.is_empty() {
                return Err(());
            }
            self.results.remove(0)
        }
    }

    fn ok(ax: i16, ay: i16) -> Result<InertialSample, ()> {
        Ok(InertialSample {
            ax,
            ay,
            ..Default::default()
        })
    }

    struct Level(Vec<bool>);

    impl embedded_hal::digital::ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.remove(0))
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    #[derive(Default)]
    struct NullPanel {
        pixels: usize,
    }

    impl OriginDimensions for NullPanel {
        fn size(&self) -> Size {
            Size::new(320, 170)
        }
    }

    impl DrawTarget for NullPanel {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Infallible>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            self.pixels += pixels.into_iter().count();
            Ok(())
        }
    }

    #[test]
    fn failed_read_enqueues_nothing() {
        let shared = Shared::new();
        let mut sensor = Scripted {
            results: vec![Err(()), ok(1, 2)],
        };
        assert_eq!(sample_once(&mut sensor, &shared), None);
        assert_eq!(shared.queued_samples(), 0);
        assert_eq!(sample_once(&mut sensor, &shared), Some(Delivery::Queued));
        assert_eq!(shared.queued_samples(), 1);
    }

    #[test]
    fn sampler_drops_when_queue_full() {
        let shared = Shared::new();
        let mut sensor = Scripted {
            results: (0..=QUEUE_DEPTH as i16).map(|n| ok(n, 0)).collect(),
        };
        for _ in 0..QUEUE_DEPTH {
            assert_eq!(sample_once(&mut sensor, &shared), Some(Delivery::Queued));
        }
        assert_eq!(sample_once(&mut sensor, &shared), Some(Delivery::Dropped));
        assert_eq!(shared.take_sample().map(|s| s.ax), Some(0));
    }

    #[test]
    fn logic_step_publishes_snapshot() {
        let shared = Shared::new();
        let mut game = Game::new(Config::default(), Calibration::default());
        logic_step(&mut game, &shared, 0);
        assert_eq!(shared.snapshot().state, GameState::Ready);
        logic_step(&mut game, &shared, 33);
        let snap = shared.snapshot();
        assert_eq!(snap.state, GameState::Playing);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.game_time_ms, 0);
    }

    #[test]
    fn held_button_latches_once() {
        let latch = PressLatch::new();
        let mut edge = EdgeDetector::new();
        let mut pin = Level(vec![false, true, true, true, false, true]);
        let presses: Vec<bool> = (0..6).map(|_| poll_button(&mut pin, &mut edge, &latch)).collect();
        assert_eq!(presses, [false, true, false, false, false, true]);
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn render_skips_when_display_busy() {
        let shared = Shared::new();
        let display: DisplayLock<NullPanel> = DisplayLock::new(NullPanel::default());
        let mut renderer = Renderer::new(Geometry::default());
        shared.publish(crate::Snapshot {
            state: GameState::Playing,
            ..crate::Snapshot::initial()
        });

        let busy = display.try_lock().unwrap();
        let drew = block_on(render_once(&display, &shared, &mut renderer, Duration::from_millis(5)));
        assert!(!drew);
        drop(busy);

        assert!(block_on(render_once(&display, &shared, &mut renderer, Duration::from_millis(5))));
        assert!(display.try_lock().unwrap().pixels > 0);
    }

    #[test]
    fn clock_overlay_only_after_tick() {
        let clock = SharedClock::new();
        let display: DisplayLock<NullPanel> = DisplayLock::new(NullPanel::default());
        let geo = Geometry::default();
        let timeout = Duration::from_millis(5);

        assert!(!block_on(clock_overlay_once(&display, &clock, &geo, timeout)));
        clock.tick();
        assert!(block_on(clock_overlay_once(&display, &clock, &geo, timeout)));
        assert!(!block_on(clock_overlay_once(&display, &clock, &geo, timeout)));
    }

    #[test]
    fn clock_overlay_timeout_still_consumes_the_second() {
        let clock = SharedClock::new();
        let display: DisplayLock<NullPanel> = DisplayLock::new(NullPanel::default());
        let geo = Geometry::default();
        let timeout = Duration::from_millis(5);

        clock.tick();
        let busy = display.try_lock().unwrap();
        assert!(!block_on(clock_overlay_once(&display, &clock, &geo, timeout)));
        drop(busy);

        assert!(!block_on(clock_overlay_once(&display, &clock, &geo, timeout)));
        assert_eq!(display.try_lock().unwrap().pixels, 0);
    }

    /// Rolls down the CLASSIC left corridor and right into the hole at
    /// column 7 row 5. Returns the time of the next tick.
    fn roll_into_hole(game: &mut Game, shared: &Shared) -> u64 {
        logic_step(game, shared, 0);
        logic_step(game, shared, 33);
        let mut t = 66;
        for n in 0..400 {
            let sample = if n < 40 { ok(-20000, 0) } else { ok(0, -20000) };
            shared.offer_sample(sample.unwrap());
            logic_step(game, shared, t);
            t += 33;
            if shared.snapshot().state != GameState::Playing {
                break;
            }
        }
        t
    }

    #[test]
    fn lost_life_hold_yields_then_resumes_on_a_fresh_period() {
        let timing = Timing {
            life_lost_hold: Duration::from_millis(30),
            ..Timing::default()
        };
        let config = Config {
            timing,
            ..Config::default()
        };
        let shared = Shared::new();
        let mut game = Game::new(config, Calibration::default());
        let same = Shared::new();
        let mut reference = Game::new(config, Calibration::default());

        let t = roll_into_hole(&mut game, &shared);
        roll_into_hole(&mut reference, &same);
        assert_eq!(shared.snapshot().state, GameState::LostLife);
        assert_eq!(shared.snapshot().lives, 2);

        assert_eq!(logic_step(&mut game, &shared, t), Tick::Hold(timing.life_lost_hold));
        logic_step(&mut reference, &same, t);
        assert_eq!(shared.snapshot().state, GameState::LostLife);

        let mut ticker = Ticker::every(Duration::from_millis(20));
        let before = Instant::now();
        let resumed = block_on(hold_then_resume(&mut game, &shared, timing.life_lost_hold, &mut ticker));
        assert!(resumed >= before.as_millis() + 30);
        let at_start = shared.snapshot();
        assert_eq!(at_start.state, GameState::Playing);
        assert_eq!(at_start.lives, 2);

        // The 20 ms period restarts at the resume; the missed ones are not replayed.
        let waiting = Instant::now();
        block_on(ticker.next());
        assert!(waiting.elapsed() >= Duration::from_millis(10));

        // The first step after the hold integrates over the time since the resume.
        reference.resume(resumed);
        shared.offer_sample(ok(-20000, 0).unwrap());
        same.offer_sample(ok(-20000, 0).unwrap());
        logic_step(&mut game, &shared, resumed + 33);
        logic_step(&mut reference, &same, resumed + 33);
        let moved = shared.snapshot();
        assert_ne!((moved.ball_x, moved.ball_y), (at_start.ball_x, at_start.ball_y));
        assert_eq!((moved.ball_x, moved.ball_y), (game.ball().x, game.ball().y));
        assert_eq!(*game.ball(), *reference.ball());
    }

    #[test]
    fn calibration_skips_failed_reads() {
        let mut sensor = Scripted {
            results: vec![ok(100, -40), Err(()), ok(300, -20), Err(())],
        };
        let cal = block_on(calibrate(&mut sensor, 4, Duration::from_ticks(0)));
        assert_eq!(
            cal,
            Calibration {
                offset_x: 200,
                offset_y: -30
            }
        );
    }
}
