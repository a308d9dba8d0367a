//! Keyboard front end standing in for the board's buttons, serial terminal
//! and analog stick.
//!
//! * `0`–`3` press push-buttons B0–B3.
//! * Arrow keys are sent as `ESC [ A..D` byte sequences, like a serial
//!   terminal would; other printable keys are sent as plain bytes.
//! * Holding `A` / `D` / `W` deflects the stick left / right / up.
//! * `Q` or Ctrl-C asks the program to quit.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use led_asteroids::input::{Button, Command, InputSource, QueuedInput, StickSample, ESCAPE};

/// A stick key counts as held if its last press/repeat event arrived within
/// this window. Covers terminals that never report key releases: OS key
/// repeat is ≥ 15 Hz, so a held key refreshes well before expiry.
const HOLD_WINDOW: Duration = Duration::from_millis(133);

const STICK_FULL: u16 = 1023;

pub struct KeyboardInput<'a> {
    rx: &'a mpsc::Receiver<Event>,
    queue: QueuedInput,
    /// Stick key → when it was last seen pressed or repeating.
    held: HashMap<char, Instant>,
    pressed_any: bool,
    quit: Arc<AtomicBool>,
}

impl<'a> KeyboardInput<'a> {
    pub fn new(rx: &'a mpsc::Receiver<Event>) -> Self {
        Self {
            rx,
            queue: QueuedInput::new(),
            held: HashMap::new(),
            pressed_any: false,
            quit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag set once the player asks to quit.
    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.quit)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// True if any key was pressed since the last call.
    pub fn take_any_press(&mut self) -> bool {
        self.pump();
        std::mem::take(&mut self.pressed_any)
    }

    /// Forget all pending input.
    pub fn clear(&mut self) {
        self.pump();
        self.queue.clear();
        self.held.clear();
        self.pressed_any = false;
    }

    fn is_held(&self, key: char, now: Instant) -> bool {
        self.held
            .get(&key)
            .map(|&last| now.duration_since(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    /// Drain all pending terminal events (non-blocking).
    fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            if let Event::Key(key) = event {
                self.handle_key(key);
            }
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, modifiers, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            if let KeyCode::Char(c) = code {
                self.held.remove(&c.to_ascii_lowercase());
            }
            return;
        }
        if kind == KeyEventKind::Press {
            self.pressed_any = true;
        }

        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit.store(true, Ordering::Release);
            }
            KeyCode::Char('q' | 'Q') => self.quit.store(true, Ordering::Release),
            KeyCode::Char(c @ '0'..='3') => {
                if let Some(button) = Button::from_index(c as u8 - b'0') {
                    self.queue.push_button(button);
                }
            }
            KeyCode::Char(c @ ('a' | 'A' | 'd' | 'D' | 'w' | 'W')) => {
                self.held.insert(c.to_ascii_lowercase(), Instant::now());
            }
            KeyCode::Char(c) if c.is_ascii() => self.queue.push_byte(c as u8),
            KeyCode::Up => self.queue.push_bytes(&[ESCAPE, b'[', b'A']),
            KeyCode::Down => self.queue.push_bytes(&[ESCAPE, b'[', b'B']),
            KeyCode::Right => self.queue.push_bytes(&[ESCAPE, b'[', b'C']),
            KeyCode::Left => self.queue.push_bytes(&[ESCAPE, b'[', b'D']),
            KeyCode::Esc => self.queue.push_byte(ESCAPE),
            _ => {}
        }
    }
}

impl InputSource for KeyboardInput<'_> {
    fn poll(&mut self) -> Option<Command> {
        self.pump();
        self.queue.poll()
    }

    fn poll_stick(&mut self) -> Option<StickSample> {
        let now = Instant::now();
        let mut sample = StickSample::CENTRE;
        if self.is_held('a', now) {
            sample.x = 0;
        } else if self.is_held('d', now) {
            sample.x = STICK_FULL;
        }
        if self.is_held('w', now) {
            sample.y = STICK_FULL;
        }
        Some(sample)
    }
}
