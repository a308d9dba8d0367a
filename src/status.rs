//! Seven-segment score readout and lives LEDs.
//!
//! The game loop publishes score and lives into a [`StatusLatch`]; the
//! background ticker calls [`StatusLatch::refresh`] once per tick, which
//! alternates between the two digits the way a multiplexed display does.
//! Everything here is atomics, so both threads share the latch through an
//! `Arc` without locking.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Segment bit patterns (bit 0 = segment a … bit 6 = segment g) for 0–9.
pub const SEGMENT_PATTERNS: [u8; 10] = [63, 6, 91, 79, 102, 109, 125, 7, 127, 111];

/// Segment pattern for a single decimal digit.
pub fn segments_for(digit: u8) -> u8 {
    SEGMENT_PATTERNS[(digit % 10) as usize]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigitSelect {
    Right,
    Left,
}

/// What the status hardware shows at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Digit currently driven.
    pub select: DigitSelect,
    /// Segments lit on that digit.
    pub segments: u8,
    /// Lit when the score no longer fits in two digits.
    pub overflow: bool,
    /// One bit per remaining life, lowest bit first.
    pub lives_leds: u8,
}

#[derive(Debug, Default)]
pub struct StatusLatch {
    score: AtomicU32,
    lives: AtomicU8,
    left_selected: AtomicBool,
    segments: AtomicU8,
}

impl StatusLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_score(&self, score: u32) {
        self.score.store(score, Ordering::Release);
    }

    pub fn publish_lives(&self, lives: u8) {
        self.lives.store(lives, Ordering::Release);
    }

    /// Switch to the other digit and latch its segments.
    pub fn refresh(&self) {
        let left = !self.left_selected.load(Ordering::Relaxed);
        let shown = self.score.load(Ordering::Acquire) % 100;
        let digit = if left { shown / 10 } else { shown % 10 };
        self.segments.store(segments_for(digit as u8), Ordering::Relaxed);
        self.left_selected.store(left, Ordering::Release);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let select = if self.left_selected.load(Ordering::Acquire) {
            DigitSelect::Left
        } else {
            DigitSelect::Right
        };
        let lives = self.lives.load(Ordering::Acquire).min(8);
        StatusSnapshot {
            select,
            segments: self.segments.load(Ordering::Relaxed),
            overflow: self.score.load(Ordering::Acquire) >= 100,
            lives_leds: ((1u16 << lives) - 1) as u8,
        }
    }
}
