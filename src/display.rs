//! Terminal rendering. All terminal I/O lives here.
//!
//! `TerminalMatrix` emulates the board: the LED matrix (drawn upright, so
//! field rows run up the screen), the two-digit seven-segment score readout
//! and the lives LEDs. The game only ever talks to it through `DisplaySink`.

use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use led_asteroids::matrix::{Colour, DisplaySink, MATRIX_SIZE};
use led_asteroids::status::{DigitSelect, StatusLatch, StatusSnapshot};

// ── Layout ────────────────────────────────────────────────────────────────────

/// Matrix rows physically fitted (the field is 8 columns wide).
const LED_ROWS: u8 = 8;

const TITLE_ROW: u16 = 0;
const MATRIX_TOP: u16 = 2;
const MATRIX_LEFT: u16 = 2;
const HUD_LEFT: u16 = MATRIX_LEFT + LED_ROWS as u16 * 2 + 4;
const BANNER_ROW: u16 = MATRIX_TOP + MATRIX_SIZE as u16 + 1;
const HINT_ROW: u16 = BANNER_ROW + 2;
const TEXT_ROW: u16 = 6;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_TITLE: Color = Color::Cyan;
const C_SEGMENT: Color = Color::Red;
const C_LIFE_ON: Color = Color::Green;
const C_LIFE_OFF: Color = Color::DarkGrey;
const C_HINT: Color = Color::DarkGrey;
const C_UNLIT: Color = Color::DarkGrey;

fn led_colour(colour: Colour) -> Color {
    match colour {
        Colour::Black => C_UNLIT,
        Colour::Red => Color::Red,
        Colour::Green => Color::Green,
        Colour::Yellow => Color::Yellow,
        Colour::Orange => Color::Rgb { r: 255, g: 140, b: 0 },
    }
}

/// Three text lines for a seven-segment digit (bit 0 = a … bit 6 = g).
fn segment_lines(segments: u8) -> [String; 3] {
    let on = |bit: u8, glyph: char| if segments & (1 << bit) != 0 { glyph } else { ' ' };
    [
        format!(" {} ", on(0, '_')),
        format!("{}{}{}", on(5, '|'), on(6, '_'), on(1, '|')),
        format!("{}{}{}", on(4, '|'), on(3, '_'), on(2, '|')),
    ]
}

// ── Sink ──────────────────────────────────────────────────────────────────────

pub struct TerminalMatrix<W: Write> {
    out: W,
    status: Arc<StatusLatch>,
    frame_step: Duration,
    /// Last segments seen on each digit; the latch only drives one at a time.
    digits: [u8; 2],
    drawn_status: Option<([u8; 2], bool, u8)>,
    dirty: bool,
    error: Option<io::Error>,
}

impl<W: Write> TerminalMatrix<W> {
    pub fn new(out: W, status: Arc<StatusLatch>, frame_step: Duration) -> Self {
        Self {
            out,
            status,
            frame_step,
            digits: [0; 2],
            drawn_status: None,
            dirty: false,
            error: None,
        }
    }

    /// First I/O error hit while drawing, if any.
    pub fn take_error(&mut self) -> io::Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.error.is_none() {
                log::error!("terminal write failed: {err}");
                self.error = Some(err);
            }
        }
        self.dirty = true;
    }

    fn flush(&mut self) {
        if self.dirty {
            let result = self.out.flush();
            self.record(result);
            self.dirty = false;
        }
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    fn draw_frame(&mut self) -> io::Result<()> {
        let out = &mut self.out;
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        out.queue(cursor::MoveTo(MATRIX_LEFT, TITLE_ROW))?;
        out.queue(style::SetForegroundColor(C_TITLE))?;
        out.queue(Print("LED ASTEROIDS"))?;

        let inner = LED_ROWS as usize * 2;
        out.queue(style::SetForegroundColor(C_BORDER))?;
        out.queue(cursor::MoveTo(MATRIX_LEFT - 1, MATRIX_TOP - 1))?;
        out.queue(Print(format!("┌{}┐", "─".repeat(inner))))?;
        out.queue(cursor::MoveTo(MATRIX_LEFT - 1, MATRIX_TOP + MATRIX_SIZE as u16))?;
        out.queue(Print(format!("└{}┘", "─".repeat(inner))))?;
        for row in 0..MATRIX_SIZE as u16 {
            out.queue(cursor::MoveTo(MATRIX_LEFT - 1, MATRIX_TOP + row))?;
            out.queue(Print("│"))?;
            out.queue(cursor::MoveTo(MATRIX_LEFT + inner as u16, MATRIX_TOP + row))?;
            out.queue(Print("│"))?;
        }

        out.queue(cursor::MoveTo(HUD_LEFT, MATRIX_TOP))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print("SCORE"))?;
        out.queue(cursor::MoveTo(HUD_LEFT, MATRIX_TOP + 6))?;
        out.queue(Print("LIVES"))?;

        out.queue(cursor::MoveTo(1, HINT_ROW))?;
        out.queue(Print("←/L → /R : Move  ↑/SPACE : Fire  P : Pause  0-3 : Buttons  A D W : Stick  Q : Quit"))?;
        out.queue(style::ResetColor)?;
        Ok(())
    }

    fn draw_pixel(&mut self, x: u8, y: u8, colour: Colour) -> io::Result<()> {
        // Matrix x runs up the screen, matrix y runs right-to-left.
        let row = MATRIX_TOP + (MATRIX_SIZE as u16 - 1 - x as u16);
        let col = MATRIX_LEFT + (LED_ROWS - 1 - y) as u16 * 2;
        self.out.queue(cursor::MoveTo(col, row))?;
        self.out.queue(style::SetForegroundColor(led_colour(colour)))?;
        self.out.queue(Print(if colour == Colour::Black { "· " } else { "██" }))?;
        Ok(())
    }

    // ── HUD ───────────────────────────────────────────────────────────────────

    fn latch(&mut self, snapshot: StatusSnapshot) {
        let slot = match snapshot.select {
            DigitSelect::Left => 0,
            DigitSelect::Right => 1,
        };
        self.digits[slot] = snapshot.segments;
    }

    fn draw_status(&mut self, snapshot: StatusSnapshot) -> io::Result<()> {
        let out = &mut self.out;
        out.queue(style::SetForegroundColor(C_SEGMENT))?;
        for (slot, &segments) in self.digits.iter().enumerate() {
            for (line, text) in segment_lines(segments).iter().enumerate() {
                out.queue(cursor::MoveTo(HUD_LEFT + slot as u16 * 4, MATRIX_TOP + 1 + line as u16))?;
                out.queue(Print(text))?;
            }
        }
        out.queue(cursor::MoveTo(HUD_LEFT, MATRIX_TOP + 4))?;
        out.queue(Print(if snapshot.overflow { "+100" } else { "    " }))?;

        out.queue(cursor::MoveTo(HUD_LEFT, MATRIX_TOP + 7))?;
        for led in 0..4 {
            let lit = snapshot.lives_leds & (1 << led) != 0;
            out.queue(style::SetForegroundColor(if lit { C_LIFE_ON } else { C_LIFE_OFF }))?;
            out.queue(Print("● "))?;
        }
        out.queue(style::ResetColor)?;
        Ok(())
    }

    fn update_status(&mut self) {
        let snapshot = self.status.snapshot();
        self.latch(snapshot);
        let key = (self.digits, snapshot.overflow, snapshot.lives_leds);
        if self.drawn_status != Some(key) {
            let result = self.draw_status(snapshot);
            self.record(result);
            self.drawn_status = Some(key);
        }
    }

    // ── Text screens ──────────────────────────────────────────────────────────

    /// Clear the screen and show centred-ish lines of text, as on the serial
    /// terminal between games.
    pub fn show_text(&mut self, lines: &[(&str, Color)]) {
        let result = (|| -> io::Result<()> {
            self.out.queue(terminal::Clear(terminal::ClearType::All))?;
            for (i, (text, colour)) in lines.iter().enumerate() {
                self.out.queue(cursor::MoveTo(10, TEXT_ROW + i as u16 * 2))?;
                self.out.queue(style::SetForegroundColor(*colour))?;
                self.out.queue(Print(*text))?;
            }
            self.out.queue(style::ResetColor)?;
            Ok(())
        })();
        self.record(result);
        self.drawn_status = None;
        self.flush();
    }

    /// Draw one frame of a scrolling banner under the matrix.
    pub fn show_banner(&mut self, frame: &str, colour: Color) {
        let result = (|| -> io::Result<()> {
            self.out.queue(cursor::MoveTo(MATRIX_LEFT, BANNER_ROW))?;
            self.out.queue(style::SetForegroundColor(colour))?;
            self.out.queue(Print(frame))?;
            self.out.queue(style::ResetColor)?;
            Ok(())
        })();
        self.record(result);
        self.flush();
    }
}

impl<W: Write> DisplaySink for TerminalMatrix<W> {
    fn set_pixel(&mut self, x: u8, y: u8, colour: Colour) {
        if x as usize >= MATRIX_SIZE || y >= LED_ROWS {
            return;
        }
        let result = self.draw_pixel(x, y, colour);
        self.record(result);
    }

    fn clear(&mut self) {
        let mut result = self.draw_frame();
        for x in 0..MATRIX_SIZE as u8 {
            for y in 0..LED_ROWS {
                if result.is_ok() {
                    result = self.draw_pixel(x, y, Colour::Black);
                }
            }
        }
        self.record(result);
        self.drawn_status = None;
    }

    fn frame_pause(&mut self) {
        self.flush();
        thread::sleep(self.frame_step);
    }

    fn present(&mut self) {
        self.update_status();
        self.flush();
    }
}
