//! End-to-end runs of the task helpers against a shared context, the way the
//! firmware wires them.

use std::convert::Infallible;

use embedded_hal::digital::{
    ErrorType,
    InputPin,
};
use tilt_maze_core::{
    Config,
    Game,
    GameState,
    Shared,
    config::QUEUE_DEPTH,
    input::EdgeDetector,
    sample::{
        Calibration,
        InertialSample,
        InertialSensor,
    },
    shared::Delivery,
    tasks::{
        logic_step,
        poll_button,
        sample_once,
    },
};

/// A board lying perfectly level.
struct LevelImu;

impl InertialSensor for LevelImu {
    type Error = Infallible;

    fn read(&mut self) -> Result<InertialSample, Infallible> {
        Ok(InertialSample {
            az: 16384,
            ..Default::default()
        })
    }
}

struct Button(bool);

impl ErrorType for Button {
    type Error = Infallible;
}

impl InputPin for Button {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0)
    }
}

const PERIOD_MS: u64 = 33;

#[test]
fn init_ready_playing_and_level_board_keeps_ball_still() {
    let shared = Shared::new();
    let mut imu = LevelImu;
    let mut game = Game::new(Config::default(), Calibration::default());

    logic_step(&mut game, &shared, 0);
    assert_eq!(shared.snapshot().state, GameState::Ready);

    logic_step(&mut game, &shared, PERIOD_MS);
    let start = shared.snapshot();
    assert_eq!(start.state, GameState::Playing);
    assert_eq!(start.game_time_ms, 0);

    for n in 2..200 {
        sample_once(&mut imu, &shared);
        logic_step(&mut game, &shared, n * PERIOD_MS);
    }
    let end = shared.snapshot();
    assert_eq!(end.state, GameState::Playing);
    assert_eq!((end.ball_x, end.ball_y), (start.ball_x, start.ball_y));
    assert_eq!(end.lives, 3);
    assert!(end.game_time_ms > 6000);
}

#[test]
fn full_queue_reports_not_delivered_and_keeps_fifo_order() {
    let shared = Shared::new();
    for n in 0..QUEUE_DEPTH as i16 {
        let sample = InertialSample {
            gx: n,
            ..Default::default()
        };
        assert_eq!(shared.offer_sample(sample), Delivery::Queued);
    }
    let extra = InertialSample {
        gx: 1000,
        ..Default::default()
    };
    assert_eq!(shared.offer_sample(extra), Delivery::Dropped);

    let drained: Vec<i16> = std::iter::from_fn(|| shared.take_sample()).map(|s| s.gx).collect();
    assert_eq!(drained, (0..QUEUE_DEPTH as i16).collect::<Vec<_>>());
}

#[test]
fn button_held_through_game_over_does_not_restart() {
    let shared = Shared::new();
    let mut game = Game::new(Config::default().with_max_lives(1), Calibration::default());
    let mut button = Button(false);
    let mut edge = EdgeDetector::new();

    logic_step(&mut game, &shared, 0);
    logic_step(&mut game, &shared, PERIOD_MS);

    // Press and keep holding while the ball rolls into a hole.
    button.0 = true;
    assert!(poll_button(&mut button, &mut edge, &shared.button));

    // CLASSIC: roll down the left corridor to row 5, then right into the
    // hole at column 7.
    let mut t = 2 * PERIOD_MS;
    for n in 0..400 {
        let tilt = if n < 40 {
            InertialSample {
                ax: -20000,
                ..Default::default()
            }
        } else {
            InertialSample {
                ay: -20000,
                ..Default::default()
            }
        };
        assert_eq!(shared.offer_sample(tilt), Delivery::Queued);
        logic_step(&mut game, &shared, t);
        t += PERIOD_MS;
        if shared.snapshot().state != GameState::Playing {
            break;
        }
    }
    assert_eq!(shared.snapshot().state, GameState::GameOver);
    assert_eq!(shared.snapshot().lives, 0);

    for _ in 0..20 {
        assert!(!poll_button(&mut button, &mut edge, &shared.button));
        logic_step(&mut game, &shared, t);
        t += PERIOD_MS;
    }
    assert_eq!(shared.snapshot().state, GameState::GameOver);

    button.0 = false;
    poll_button(&mut button, &mut edge, &shared.button);
    button.0 = true;
    assert!(poll_button(&mut button, &mut edge, &shared.button));
    logic_step(&mut game, &shared, t);
    assert_eq!(shared.snapshot().state, GameState::Init);
}
