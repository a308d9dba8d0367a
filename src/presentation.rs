//! Session-boundary visuals: the game-over sweep on the matrix and the
//! scrolling banner used by the splash and game-over screens.

use crate::entities::{Position, FIELD_HEIGHT, FIELD_WIDTH};
use crate::matrix::{draw_cell, Colour, DisplaySink};

pub const SPLASH_BANNER: &str = "ASTEROIDS";
pub const GAME_OVER_BANNER: &str = "GAME OVER";

/// Diagonal sweeps drawn one cell at a time when a game ends: an orange
/// stroke falling from the top-left, then yellow strokes rising from the
/// right, each from a lower starting row.
pub fn game_over_visual<D: DisplaySink + ?Sized>(display: &mut D) {
    display.clear();
    let strokes: [(Colour, fn(i32) -> Position); 4] = [
        (Colour::Orange, |x| Position::new(x, FIELD_HEIGHT - 1 - x)),
        (Colour::Yellow, |x| Position::new(FIELD_WIDTH - 1 - x, FIELD_WIDTH - 1 - x + 5)),
        (Colour::Orange, |x| Position::new(x, FIELD_HEIGHT - 1 - x)),
        (Colour::Yellow, |x| Position::new(FIELD_WIDTH - 1 - x, FIELD_WIDTH - 1 - x + 2)),
    ];
    for (colour, cell) in strokes {
        for step in 0..FIELD_WIDTH {
            draw_cell(display, cell(step), colour);
            display.frame_pause();
        }
    }
    display.present();
}

/// Text scrolling right-to-left through a fixed-width window.
#[derive(Clone, Debug)]
pub struct Banner {
    text: Vec<char>,
    width: usize,
    offset: usize,
}

impl Banner {
    pub fn new(text: &str, width: usize) -> Self {
        Self {
            text: text.chars().collect(),
            width,
            offset: 0,
        }
    }

    /// The visible window, padded with spaces.
    pub fn frame(&self) -> String {
        (0..self.width)
            .map(|col| {
                // The text enters from the right edge of the window.
                (self.offset + col)
                    .checked_sub(self.width)
                    .and_then(|i| self.text.get(i))
                    .copied()
                    .unwrap_or(' ')
            })
            .collect()
    }

    /// Scroll one column. Returns `false` once the text has left the window.
    pub fn advance(&mut self) -> bool {
        if self.offset >= self.text.len() + self.width {
            return false;
        }
        self.offset += 1;
        self.offset < self.text.len() + self.width
    }

    pub fn restart(&mut self) {
        self.offset = 0;
    }
}
