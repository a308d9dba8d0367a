use led_asteroids::input::*;

/// Poll once per queued item and keep the commands produced.
fn drain(input: &mut QueuedInput, items: usize) -> Vec<Command> {
    (0..items).filter_map(|_| input.poll()).collect()
}

// ── Escape parser ─────────────────────────────────────────────────────────────

#[test]
fn cursor_sequence_completes_on_third_byte() {
    let mut parser = EscapeParser::new();
    assert_eq!(parser.feed(ESCAPE), None);
    assert_eq!(parser.feed(b'['), None);
    assert_eq!(parser.feed(b'D'), Some(SerialToken::Escape(b'D')));
    // Back to idle: the next byte is plain.
    assert_eq!(parser.feed(b'D'), Some(SerialToken::Plain(b'D')));
}

#[test]
fn plain_bytes_pass_straight_through() {
    let mut parser = EscapeParser::new();
    assert_eq!(parser.feed(b'r'), Some(SerialToken::Plain(b'r')));
    assert_eq!(parser.feed(b'['), Some(SerialToken::Plain(b'[')));
    assert_eq!(parser.feed(b'A'), Some(SerialToken::Plain(b'A')));
}

#[test]
fn broken_sequence_hands_back_the_stray_byte() {
    let mut parser = EscapeParser::new();
    parser.feed(ESCAPE);
    assert_eq!(parser.feed(b'x'), Some(SerialToken::Plain(b'x')));
    // Parser is usable again straight away.
    parser.feed(ESCAPE);
    parser.feed(b'[');
    assert_eq!(parser.feed(b'A'), Some(SerialToken::Escape(b'A')));
}

#[test]
fn reset_abandons_sequence() {
    let mut parser = EscapeParser::new();
    parser.feed(ESCAPE);
    parser.feed(b'[');
    parser.reset();
    assert_eq!(parser.feed(b'D'), Some(SerialToken::Plain(b'D')));
}

#[test]
fn serial_tokens_map_to_commands() {
    use SerialToken::*;
    assert_eq!(Escape(b'D').command(), Some(Command::MoveLeft));
    assert_eq!(Escape(b'C').command(), Some(Command::MoveRight));
    assert_eq!(Escape(b'A').command(), Some(Command::Fire));
    assert_eq!(Escape(b'B').command(), Some(Command::Down));
    assert_eq!(Escape(b'Z').command(), None);
    assert_eq!(Plain(b'l').command(), Some(Command::MoveLeft));
    assert_eq!(Plain(b'L').command(), Some(Command::MoveLeft));
    assert_eq!(Plain(b'r').command(), Some(Command::MoveRight));
    assert_eq!(Plain(b'R').command(), Some(Command::MoveRight));
    assert_eq!(Plain(b' ').command(), Some(Command::Fire));
    assert_eq!(Plain(b'p').command(), Some(Command::PauseToggle));
    assert_eq!(Plain(b'P').command(), Some(Command::PauseToggle));
    assert_eq!(Plain(b'D').command(), None);
    assert_eq!(Plain(b'x').command(), None);
}

// ── Buttons ───────────────────────────────────────────────────────────────────

#[test]
fn buttons_map_to_commands() {
    assert_eq!(Button::B0.command(), Command::MoveRight);
    assert_eq!(Button::B1.command(), Command::Down);
    assert_eq!(Button::B2.command(), Command::Fire);
    assert_eq!(Button::B3.command(), Command::MoveLeft);
    assert_eq!(Button::from_index(2), Some(Button::B2));
    assert_eq!(Button::from_index(4), None);
}

// ── Queued input ──────────────────────────────────────────────────────────────

#[test]
fn empty_queue_yields_nothing() {
    let mut input = QueuedInput::new();
    assert_eq!(input.poll(), None);
    assert_eq!(input.poll_stick(), None);
}

#[test]
fn buttons_win_over_serial() {
    let mut input = QueuedInput::new();
    input.push_byte(b'r');
    input.push_button(Button::B3);
    assert_eq!(input.poll(), Some(Command::MoveLeft));
    assert_eq!(input.poll(), Some(Command::MoveRight));
    assert_eq!(input.poll(), None);
}

#[test]
fn one_serial_byte_per_poll() {
    let mut input = QueuedInput::new();
    input.push_bytes(&[ESCAPE, b'[', b'C']);
    assert_eq!(input.poll(), None);
    assert_eq!(input.poll(), None);
    assert_eq!(input.poll(), Some(Command::MoveRight));
    assert_eq!(input.poll(), None);
}

#[test]
fn mixed_serial_stream_decodes_in_order() {
    let mut input = QueuedInput::new();
    input.push_bytes(&[b'l', ESCAPE, b'[', b'A', b'x', b'p', ESCAPE, b'q', b' ']);
    assert_eq!(
        drain(&mut input, 9),
        vec![Command::MoveLeft, Command::Fire, Command::PauseToggle, Command::Fire]
    );
}

#[test]
fn button_arriving_mid_sequence_does_not_break_it() {
    let mut input = QueuedInput::new();
    input.push_bytes(&[ESCAPE, b'[']);
    assert_eq!(input.poll(), None);
    input.push_button(Button::B2);
    input.push_byte(b'D');
    assert_eq!(input.poll(), Some(Command::Fire));
    assert_eq!(input.poll(), None); // the '['
    assert_eq!(input.poll(), Some(Command::MoveLeft));
}

#[test]
fn clear_drops_pending_input_and_partial_sequence() {
    let mut input = QueuedInput::new();
    input.push_button(Button::B0);
    input.push_bytes(&[ESCAPE, b'[']);
    input.poll(); // consumes the button
    input.poll(); // ESC
    input.poll(); // '['
    input.clear();
    assert_eq!(input.poll(), None);
    // Without the reset this would complete `ESC [ D`.
    input.push_byte(b'D');
    assert_eq!(input.poll(), None, "'D' alone is not a command");
}

#[test]
fn clear_drops_buttons_and_serial_alike() {
    let mut input = QueuedInput::new();
    input.push_byte(b'r');
    input.push_button(Button::B1);
    input.clear();
    assert_eq!(input.poll(), None);
    input.push_byte(b'r');
    assert_eq!(input.poll(), Some(Command::MoveRight));
}

#[test]
fn stick_sample_is_reported() {
    let mut input = QueuedInput::new();
    input.set_stick(Some(StickSample { x: 0, y: 510 }));
    assert_eq!(input.poll_stick(), Some(StickSample { x: 0, y: 510 }));
    input.set_stick(None);
    assert_eq!(input.poll_stick(), None);
}
