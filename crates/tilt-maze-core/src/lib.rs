//! # tilt-maze-core
//!
//! Hardware-independent half of the tilt maze firmware: the game state
//! machine, ball physics, maze data, wall clock, the shared context that
//! connects the periodic tasks, and the renderer.
//!
//! Everything here is `no_std` and builds on the host, so the logic is tested
//! with plain `cargo test`. The board crate supplies the peripherals through
//! small traits:
//!
//! - [`sample::InertialSensor`] for the IMU
//! - [`embedded_hal::digital::InputPin`] for the restart button
//! - [`embedded_graphics::draw_target::DrawTarget`] for the display
//!
//! ## Task graph
//!
//! ```text
//! sensor sampler ──queue──▶ game logic ──snapshot──▶ renderer
//! input sampler ──press latch──▶ game logic
//! clock timer ──clock──▶ clock renderer
//! ```
//!
//! The task bodies live in [`tasks`]; the firmware binary wraps each one in an
//! `#[embassy_executor::task]`.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod ball;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod maze;
pub mod render;
pub mod sample;
pub mod shared;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::StartupError;
pub use game::Game;
pub use shared::{
    DisplayLock,
    Shared,
    Snapshot,
};
pub use state::GameState;
