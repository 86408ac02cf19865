//! Compile-time tuning: screen geometry, physics constants and task timing.
//!
//! All values are plain `Copy` structs so the firmware can tweak them with the
//! `with_*` setters before handing a [`Config`] to the tasks.

use embassy_time::Duration;

/// Depth of the sensor sample queue between the sampler and the game logic.
pub const QUEUE_DEPTH: usize = 10;

/// Screen dimensions of the badge panel (landscape).
pub const SCREEN_W: i32 = 320;
pub const SCREEN_H: i32 = 170;

/// Where the maze sits on screen and how big things are, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub cell_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub ball_radius: f32,
    /// Left edge of the HUD column to the right of the maze.
    pub panel_x: i32,
}

impl Geometry {
    /// Grid index for a pixel coordinate along one axis.
    ///
    /// Truncates toward zero, so a point just left of (or above) the maze
    /// still maps to index 0 rather than -1.
    pub fn cell_index(&self, pixel: f32, offset: f32) -> i32 {
        ((pixel - offset) / self.cell_size) as i32
    }

    /// Pixel center of a cell.
    pub fn cell_center(&self, col: u8, row: u8) -> (f32, f32) {
        (
            f32::from(col) * self.cell_size + self.cell_size / 2.0 + self.offset_x,
            f32::from(row) * self.cell_size + self.cell_size / 2.0 + self.offset_y,
        )
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            offset_x: 5.0,
            offset_y: 5.0,
            ball_radius: 3.0,
            panel_x: 180,
        }
    }
}

/// Ball dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    /// px/s² at a tilt of one raw accelerometer unit, before `tilt_scale`.
    pub gravity: f32,
    pub tilt_scale: f32,
    /// Speed cap in px/s.
    pub max_speed: f32,
    /// Velocity multiplier applied every step; 1.0 disables friction.
    pub friction: f32,
    /// Velocity multiplier applied when a move is rejected by a wall.
    pub bounce: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: 200.0,
            tilt_scale: 0.0005,
            max_speed: 40.0,
            friction: 1.0,
            bounce: -0.3,
        }
    }
}

/// Task periods and timeouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub sensor_period: Duration,
    pub logic_period: Duration,
    pub render_period: Duration,
    pub input_period: Duration,
    pub clock_period: Duration,
    pub clock_render_period: Duration,
    pub render_lock_timeout: Duration,
    pub clock_lock_timeout: Duration,
    pub life_lost_hold: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            sensor_period: Duration::from_millis(33),
            logic_period: Duration::from_millis(33),
            render_period: Duration::from_millis(100),
            input_period: Duration::from_millis(100),
            clock_period: Duration::from_millis(1000),
            clock_render_period: Duration::from_millis(1000),
            render_lock_timeout: Duration::from_millis(100),
            clock_lock_timeout: Duration::from_millis(50),
            life_lost_hold: Duration::from_millis(1000),
        }
    }
}

/// Tilt-driven map selection menu.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Menu {
    /// Screen-x tilt (calibrated raw units) needed to step the selection.
    pub navigate_threshold: f32,
    /// Screen-y tilt needed to confirm the selection.
    pub confirm_threshold: f32,
    /// Minimum time between two selection steps, in ms.
    pub repeat_ms: u64,
}

impl Default for Menu {
    fn default() -> Self {
        Self {
            navigate_threshold: 4000.0,
            confirm_threshold: 5000.0,
            repeat_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub geometry: Geometry,
    pub physics: Physics,
    pub timing: Timing,
    pub menu: Menu,
    pub max_lives: u8,
    /// Show the map selection menu before every round.
    pub map_select: bool,
    pub calibration_samples: u16,
    pub calibration_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            physics: Physics::default(),
            timing: Timing::default(),
            menu: Menu::default(),
            max_lives: 3,
            map_select: false,
            calibration_samples: 50,
            calibration_interval: Duration::from_millis(20),
        }
    }
}

impl Config {
    pub fn with_map_select(mut self, enabled: bool) -> Self {
        self.map_select = enabled;
        self
    }

    pub fn with_max_lives(mut self, lives: u8) -> Self {
        self.max_lives = lives;
        self
    }
}
