//! Player input: push-buttons, serial terminal bytes and the analog stick.
//!
//! At most one [`Command`] is produced per poll. A pending button press
//! always wins over serial input; serial bytes are consumed one per poll
//! and run through an [`EscapeParser`] so that cursor-key sequences
//! (`ESC [ A..D`) become commands.

use std::collections::VecDeque;

/// ASCII escape, the first byte of a cursor-key sequence.
pub const ESCAPE: u8 = 0x1b;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Fire,
    PauseToggle,
    Down,
}

/// The four push-buttons, numbered as on the board (B0 rightmost).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    B0,
    B1,
    B2,
    B3,
}

impl Button {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Button::B0),
            1 => Some(Button::B1),
            2 => Some(Button::B2),
            3 => Some(Button::B3),
            _ => None,
        }
    }

    pub fn command(self) -> Command {
        match self {
            Button::B0 => Command::MoveRight,
            Button::B1 => Command::Down,
            Button::B2 => Command::Fire,
            Button::B3 => Command::MoveLeft,
        }
    }
}

// ── Serial escape sequences ───────────────────────────────────────────────────

/// A complete unit of serial input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerialToken {
    /// An ordinary byte.
    Plain(u8),
    /// The final byte of an `ESC [ x` sequence.
    Escape(u8),
}

impl SerialToken {
    pub fn command(self) -> Option<Command> {
        match self {
            SerialToken::Escape(b'D') => Some(Command::MoveLeft),
            SerialToken::Escape(b'C') => Some(Command::MoveRight),
            SerialToken::Escape(b'A') => Some(Command::Fire),
            SerialToken::Escape(b'B') => Some(Command::Down),
            SerialToken::Plain(b'l' | b'L') => Some(Command::MoveLeft),
            SerialToken::Plain(b'r' | b'R') => Some(Command::MoveRight),
            SerialToken::Plain(b' ') => Some(Command::Fire),
            SerialToken::Plain(b'p' | b'P') => Some(Command::PauseToggle),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum EscapeState {
    #[default]
    Idle,
    SawEscape,
    SawBracket,
}

/// Byte-at-a-time parser for `ESC [ x` sequences.
///
/// A byte other than `[` after `ESC` abandons the sequence; that byte is
/// then handed back as plain input.
#[derive(Clone, Debug, Default)]
pub struct EscapeParser {
    state: EscapeState,
}

impl EscapeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns a token once one is complete.
    pub fn feed(&mut self, byte: u8) -> Option<SerialToken> {
        match (self.state, byte) {
            (EscapeState::Idle, ESCAPE) => {
                self.state = EscapeState::SawEscape;
                None
            }
            (EscapeState::SawEscape, b'[') => {
                self.state = EscapeState::SawBracket;
                None
            }
            (EscapeState::SawBracket, final_byte) => {
                self.state = EscapeState::Idle;
                Some(SerialToken::Escape(final_byte))
            }
            (_, other) => {
                self.state = EscapeState::Idle;
                Some(SerialToken::Plain(other))
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = EscapeState::Idle;
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// One analog stick reading (10-bit ADC values, centre ≈ 512).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StickSample {
    pub x: u16,
    pub y: u16,
}

impl StickSample {
    pub const CENTRE: StickSample = StickSample { x: 522, y: 510 };
}

pub trait InputSource {
    /// The next command, if one is pending. Never blocks.
    fn poll(&mut self) -> Option<Command>;

    /// Latest stick reading, if a stick is fitted. Never blocks.
    fn poll_stick(&mut self) -> Option<StickSample> {
        None
    }
}

/// Buffered button presses and serial bytes, merged with button priority.
#[derive(Clone, Debug, Default)]
pub struct QueuedInput {
    buttons: VecDeque<Button>,
    serial: VecDeque<u8>,
    stick: Option<StickSample>,
    parser: EscapeParser,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_button(&mut self, button: Button) {
        self.buttons.push_back(button);
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.serial.push_back(byte);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.serial.extend(bytes.iter().copied());
    }

    pub fn set_stick(&mut self, sample: Option<StickSample>) {
        self.stick = sample;
    }

    /// Drop everything waiting, including a half-received escape sequence.
    pub fn clear(&mut self) {
        self.buttons.clear();
        self.serial.clear();
        self.parser.reset();
    }
}

impl InputSource for QueuedInput {
    fn poll(&mut self) -> Option<Command> {
        if let Some(button) = self.buttons.pop_front() {
            return Some(button.command());
        }
        let byte = self.serial.pop_front()?;
        self.parser.feed(byte).and_then(SerialToken::command)
    }

    fn poll_stick(&mut self) -> Option<StickSample> {
        self.stick
    }
}
