//! Display sink interface.
//!
//! The game never lights a pixel itself: it hands matrix coordinates and a
//! colour to a [`DisplaySink`]. Field coordinates are remapped onto the
//! matrix by [`matrix_coords`]: field rows run along matrix columns and
//! field columns run along matrix rows, mirrored.

use crate::entities::{Position, FIELD_WIDTH};

/// Matrix addressing range on both axes.
pub const MATRIX_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub enum Colour {
    #[default]
    Black,
    Red,
    Green,
    Yellow,
    Orange,
}

pub const COLOUR_ASTEROID: Colour = Colour::Green;
pub const COLOUR_PROJECTILE: Colour = Colour::Red;
pub const COLOUR_BASE: Colour = Colour::Yellow;
pub const COLOUR_EXPLOSION: Colour = Colour::Orange;
pub const COLOUR_BASE_HIT: Colour = Colour::Red;

pub trait DisplaySink {
    fn set_pixel(&mut self, x: u8, y: u8, colour: Colour);

    fn clear(&mut self);

    /// Called between the frames of a short animation.
    fn frame_pause(&mut self) {}

    /// Called once per loop iteration after all pixel updates.
    fn present(&mut self) {}
}

/// Matrix `(x, y)` for a field position.
pub fn matrix_coords(pos: Position) -> (u8, u8) {
    (pos.y as u8, (FIELD_WIDTH - 1 - pos.x) as u8)
}

/// Light the matrix pixel for `pos`. Positions off the field are ignored.
pub fn draw_cell<D: DisplaySink + ?Sized>(display: &mut D, pos: Position, colour: Colour) {
    if pos.is_valid() {
        let (x, y) = matrix_coords(pos);
        display.set_pixel(x, y, colour);
    }
}

// ── In-memory sink ────────────────────────────────────────────────────────────

/// A plain 16×16 pixel buffer. Counts writes so callers can tell whether
/// anything was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pixels: [[Colour; MATRIX_SIZE]; MATRIX_SIZE],
    writes: usize,
    clears: usize,
    pauses: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: [[Colour::Black; MATRIX_SIZE]; MATRIX_SIZE],
            writes: 0,
            clears: 0,
            pauses: 0,
        }
    }

    pub fn pixel(&self, x: u8, y: u8) -> Colour {
        self.pixels
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or_default()
    }

    /// Colour currently shown for a field cell.
    pub fn field_pixel(&self, pos: Position) -> Colour {
        if !pos.is_valid() {
            return Colour::Black;
        }
        let (x, y) = matrix_coords(pos);
        self.pixel(x, y)
    }

    /// Number of lit pixels of the given colour.
    pub fn count(&self, colour: Colour) -> usize {
        self.pixels
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == colour)
            .count()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn pauses(&self) -> usize {
        self.pauses
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for FrameBuffer {
    fn set_pixel(&mut self, x: u8, y: u8, colour: Colour) {
        if let Some(cell) = self
            .pixels
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = colour;
            self.writes += 1;
        } else {
            log::debug!("pixel ({x}, {y}) outside the matrix ignored");
        }
    }

    fn clear(&mut self) {
        self.pixels = [[Colour::Black; MATRIX_SIZE]; MATRIX_SIZE];
        self.clears += 1;
    }

    fn frame_pause(&mut self) {
        self.pauses += 1;
    }
}
