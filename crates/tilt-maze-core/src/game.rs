//! The game state machine.
//!
//! [`Game`] owns the maze, the ball and the round bookkeeping. It is driven
//! one step at a time by [`Game::tick`]; the async task in [`crate::tasks`]
//! only supplies the time and the inputs and honours the returned [`Tick`].

use embassy_time::Duration;

use crate::{
    ball::{
        Ball,
        Motion,
    },
    config::Config,
    maze::{
        self,
        Cell,
        MAPS,
        Maze,
    },
    sample::{
        Calibration,
        InertialSample,
    },
    shared::Snapshot,
    state::GameState,
};

/// What one logic step may consume.
pub trait TickInputs {
    /// Pops the oldest queued sample without waiting.
    fn next_sample(&mut self) -> Option<InertialSample>;

    /// Returns and clears the one-shot button flag.
    fn take_press(&mut self) -> bool;
}

/// What the logic task should do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Wait for the next period.
    Continue,
    /// Stall this task for the given time, then call [`Game::resume`].
    Hold(Duration),
}

pub struct Game {
    config: Config,
    calibration: Calibration,
    state: GameState,
    map: usize,
    maze: Maze,
    ball: Ball,
    lives: u8,
    start_ms: u64,
    game_time_ms: u32,
    best_time_ms: Option<u32>,
    last_tick_ms: Option<u64>,
    last_menu_move_ms: Option<u64>,
}

impl Game {
    pub fn new(config: Config, calibration: Calibration) -> Self {
        let maze = Maze::load(0);
        let ball = Ball::at_cell(&config.geometry, maze.start());
        Self {
            config,
            calibration,
            state: GameState::Init,
            map: 0,
            maze,
            ball,
            lives: config.max_lives,
            start_ms: 0,
            game_time_ms: 0,
            best_time_ms: None,
            last_tick_ms: None,
            last_menu_move_ms: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn map(&self) -> usize {
        self.map
    }

    pub fn game_time_ms(&self) -> u32 {
        self.game_time_ms
    }

    pub fn best_time_ms(&self) -> Option<u32> {
        self.best_time_ms
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            map: self.map,
            ball_x: self.ball.x,
            ball_y: self.ball.y,
            lives: self.lives,
            game_time_ms: self.game_time_ms,
            best_time_ms: self.best_time_ms,
        }
    }

    /// Runs one logic step at time `now_ms` (monotonic milliseconds).
    pub fn tick(&mut self, now_ms: u64, inputs: &mut impl TickInputs) -> Tick {
        let dt = match self.last_tick_ms.replace(now_ms) {
            Some(prev) => now_ms.saturating_sub(prev) as f32 / 1000.0,
            None => 0.0,
        };

        match self.state {
            GameState::Init => {
                if self.config.map_select {
                    self.set_state(GameState::SelectMap);
                } else {
                    self.prepare_round();
                    self.set_state(GameState::Ready);
                }
            }
            GameState::SelectMap => self.select_map(now_ms, inputs),
            GameState::Ready => {
                self.start_ms = now_ms;
                self.game_time_ms = 0;
                self.set_state(GameState::Playing);
            }
            GameState::Playing => self.play(now_ms, dt, inputs),
            GameState::LostLife => {
                self.ball = Ball::at_cell(&self.config.geometry, self.maze.start());
                return Tick::Hold(self.config.timing.life_lost_hold);
            }
            GameState::Paused | GameState::Won | GameState::GameOver => {
                if self.state.is_terminal() && inputs.take_press() {
                    self.set_state(GameState::Init);
                }
            }
        }
        Tick::Continue
    }

    /// Ends a [`Tick::Hold`]. The next `dt` is measured from `now_ms`.
    pub fn resume(&mut self, now_ms: u64) {
        if self.state == GameState::LostLife {
            self.set_state(GameState::Playing);
        }
        self.last_tick_ms = Some(now_ms);
    }

    fn set_state(&mut self, next: GameState) {
        info!("state {} -> {}", self.state, next);
        self.state = next;
    }

    fn prepare_round(&mut self) {
        self.maze = Maze::load(self.map);
        self.ball = Ball::at_cell(&self.config.geometry, self.maze.start());
        self.lives = self.config.max_lives;
        self.game_time_ms = 0;
    }

    fn select_map(&mut self, now_ms: u64, inputs: &mut impl TickInputs) {
        let Some(sample) = inputs.next_sample() else {
            return;
        };
        let tilt = self.calibration.tilt(&sample);
        let menu = self.config.menu;

        let can_move = self
            .last_menu_move_ms
            .is_none_or(|t| now_ms.saturating_sub(t) > menu.repeat_ms);
        if can_move {
            if tilt.x > menu.navigate_threshold {
                self.map = (self.map + 1) % MAPS.len();
                self.last_menu_move_ms = Some(now_ms);
                info!("menu map {}", maze::map(self.map).name);
            } else if tilt.x < -menu.navigate_threshold {
                self.map = (self.map + MAPS.len() - 1) % MAPS.len();
                self.last_menu_move_ms = Some(now_ms);
                info!("menu map {}", maze::map(self.map).name);
            }
        }

        if tilt.y > menu.confirm_threshold {
            self.prepare_round();
            self.set_state(GameState::Ready);
        }
    }

    fn play(&mut self, now_ms: u64, dt: f32, inputs: &mut impl TickInputs) {
        self.game_time_ms = u32::try_from(now_ms.saturating_sub(self.start_ms)).unwrap_or(u32::MAX);

        if let Some(sample) = inputs.next_sample() {
            let tilt = self.calibration.tilt(&sample);
            let motion = self.ball.step(
                dt,
                tilt,
                &self.maze,
                &self.config.geometry,
                &self.config.physics,
            );
            if motion == Motion::Bounced {
                trace!("bounce at {} {}", self.ball.x, self.ball.y);
            }
        }

        match self.ball.cell(&self.maze, &self.config.geometry) {
            Cell::Hole => {
                self.lives = self.lives.saturating_sub(1);
                info!("fell in a hole, {} lives left", self.lives);
                if self.lives > 0 {
                    self.set_state(GameState::LostLife);
                } else {
                    inputs.take_press();
                    self.set_state(GameState::GameOver);
                }
            }
            Cell::Goal => {
                if self.best_time_ms.is_none_or(|best| self.game_time_ms < best) {
                    self.best_time_ms = Some(self.game_time_ms);
                }
                info!("won in {} ms", self.game_time_ms);
                inputs.take_press();
                self.set_state(GameState::Won);
            }
            Cell::Empty | Cell::Wall => {}
        }
    }
}
