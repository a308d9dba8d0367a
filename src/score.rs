//! Score and lives tracking.

use std::sync::Arc;

use crate::status::StatusLatch;

pub const INITIAL_LIVES: u8 = 4;

/// Score and remaining lives for one session. When built with a
/// [`StatusLatch`], every change is mirrored onto it for the status display.
#[derive(Clone, Debug)]
pub struct ScoreBoard {
    score: u32,
    lives: u8,
    status: Option<Arc<StatusLatch>>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            score: 0,
            lives: INITIAL_LIVES,
            status: None,
        }
    }

    pub fn with_status(status: Arc<StatusLatch>) -> Self {
        let board = Self {
            status: Some(status),
            ..Self::new()
        };
        board.publish();
        board
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.publish();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Lose one life. Returns `true` when no lives remain.
    pub fn decrement_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.publish();
        self.lives == 0
    }

    /// Back to zero score and full lives for a new session.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = INITIAL_LIVES;
        self.publish();
    }

    fn publish(&self) {
        if let Some(status) = &self.status {
            status.publish_score(self.score);
            status.publish_lives(self.lives);
        }
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}
