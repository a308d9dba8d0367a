//! LED Asteroids: a fixed-grid asteroid defence game.
//!
//! Core modules:
//! - `entities`: field geometry, positions and the `GameSession` aggregate
//! - `compute`: the game state engine (move, fire, advance, collisions)
//! - `session`: cadence scheduling, pause handling and input dispatch
//! - `input`: button/serial command merging and the escape-sequence parser
//! - `clock`: the millisecond clock and its background ticker
//! - `score`: score and lives tracking
//! - `status`: seven-segment score readout and lives LEDs
//! - `matrix`: the display sink interface and an in-memory frame buffer
//! - `presentation`: session-boundary visuals and scrolling banners

pub mod clock;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;
pub mod matrix;
pub mod presentation;
pub mod score;
pub mod session;
pub mod status;

pub use config::GameConfig;
pub use entities::{Direction, GameSession, GameState, Position};
pub use error::{GameError, Result};
