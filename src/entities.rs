//! All game entity types: pure data, no logic.

use heapless::Vec;

use crate::score::ScoreBoard;

// ── Field geometry ────────────────────────────────────────────────────────────

pub const FIELD_WIDTH: i32 = 8;
pub const FIELD_HEIGHT: i32 = 16;

/// Number of cells in the play field.
pub const FIELD_CELLS: usize = (FIELD_WIDTH * FIELD_HEIGHT) as usize;

pub const MAX_PROJECTILES: usize = 4;
pub const MAX_ASTEROIDS: usize = 20;

/// Bottom row of the base (three cells wide).
pub const BASE_ROW: i32 = 0;
/// Single-cell tip of the base. Asteroids arriving here next to the base hit it.
pub const BASE_TIP_ROW: i32 = BASE_ROW + 1;
/// New projectiles appear directly above the base tip.
pub const PROJECTILE_SPAWN_ROW: i32 = BASE_TIP_ROW + 1;
/// Projectiles reaching this row leave the field.
pub const PROJECTILE_EXIT_ROW: i32 = FIELD_HEIGHT - 1;
/// Replacement asteroids always enter on the top row.
pub const ASTEROID_SPAWN_ROW: i32 = FIELD_HEIGHT - 1;
/// Initial asteroids are never placed in the lowest three rows.
pub const ASTEROID_MIN_START_ROW: i32 = 3;

/// Horizontal centre of the field, where the base starts.
pub const BASE_START: i32 = (FIELD_WIDTH - 1) / 2;

// ── Positions ─────────────────────────────────────────────────────────────────

/// A cell on the play field. `x` grows to the right, `y` grows upwards
/// from the base row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Sentinel for "no position". Marks an asteroid lifted off the field
    /// while it waits to re-enter on the top row; drawing it is a no-op.
    pub const INVALID: Position = Position { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// True if the position lies inside the play field.
    pub fn is_valid(&self) -> bool {
        (0..FIELD_WIDTH).contains(&self.x) && (0..FIELD_HEIGHT).contains(&self.y)
    }

    pub fn above(&self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    pub fn below(&self) -> Self {
        Self::new(self.x, self.y - 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn offset(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

// ── Entity collections ────────────────────────────────────────────────────────

/// Projectiles in flight, in firing order. Removal shifts later entries down.
pub type Projectiles = Vec<Position, MAX_PROJECTILES>;

/// Asteroids on the field. Removal moves the last entry into the gap.
pub type Asteroids = Vec<Position, MAX_ASTEROIDS>;

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything the game state engine owns for one session.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Column of the base centre, always in `0..FIELD_WIDTH`.
    pub base_position: i32,
    pub projectiles: Projectiles,
    pub asteroids: Asteroids,
    pub game_over: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            base_position: BASE_START,
            projectiles: Vec::new(),
            asteroids: Vec::new(),
            game_over: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole mutable world of a play-through: entities plus score and lives.
#[derive(Clone, Debug, Default)]
pub struct GameSession {
    pub state: GameState,
    pub scores: ScoreBoard,
}

impl GameSession {
    pub fn new(scores: ScoreBoard) -> Self {
        Self {
            state: GameState::new(),
            scores,
        }
    }
}
