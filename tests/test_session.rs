use std::ops::ControlFlow;

use led_asteroids::clock::{Clock, ManualClock};
use led_asteroids::config::{GameConfig, TimingConfig};
use led_asteroids::entities::*;
use led_asteroids::input::{Button, QueuedInput, StickSample};
use led_asteroids::matrix::FrameBuffer;
use led_asteroids::session::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

struct Rig {
    clock: ManualClock,
    input: QueuedInput,
    fb: FrameBuffer,
    rng: StdRng,
    session: GameSession,
    game_loop: SessionLoop,
}

impl Rig {
    /// An empty field with the loop started at t = 0.
    fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    fn with_config(config: &GameConfig) -> Self {
        let clock = ManualClock::new(0);
        let game_loop = SessionLoop::start(config, clock.now());
        Self {
            clock,
            input: QueuedInput::new(),
            fb: FrameBuffer::new(),
            rng: StdRng::seed_from_u64(3),
            session: GameSession::default(),
            game_loop,
        }
    }

    fn step_at(&mut self, now: u64) -> StepOutcome {
        self.clock.set(now);
        self.game_loop.step(
            &mut self.session,
            &self.clock,
            &mut self.input,
            &mut self.fb,
            &mut self.rng,
        )
    }

    fn projectile(&self) -> Position {
        self.session.state.projectiles[0]
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[test]
fn intervals_start_at_base_values() {
    let s = Scheduler::new(TimingConfig::default(), 0);
    assert_eq!(s.projectile_interval(0), 500);
    assert_eq!(s.asteroid_interval(0), 1000);
    assert_eq!(s.projectile_interval(9), 500);
    assert_eq!(s.asteroid_interval(9), 1000);
}

#[test]
fn intervals_shrink_with_score() {
    let s = Scheduler::new(TimingConfig::default(), 0);
    assert_eq!(s.projectile_interval(10), 490);
    assert_eq!(s.asteroid_interval(10), 980);
    assert_eq!(s.projectile_interval(300), 200);
    assert_eq!(s.asteroid_interval(300), 400);
}

#[test]
fn intervals_never_drop_below_minimum() {
    let s = Scheduler::new(TimingConfig::default(), 0);
    assert_eq!(s.projectile_interval(450), 50);
    assert_eq!(s.asteroid_interval(450), 100);
    assert_eq!(s.projectile_interval(1000), 50);
    assert_eq!(s.asteroid_interval(u32::MAX), 100);
}

#[test]
fn nothing_due_while_paused() {
    let mut s = Scheduler::new(TimingConfig::default(), 0);
    s.pause(10);
    assert!(s.is_paused());
    assert!(!s.projectiles_due(5_000, 0));
    assert!(!s.asteroids_due(5_000, 0));
}

#[test]
fn resume_shifts_both_timers() {
    let mut s = Scheduler::new(TimingConfig::default(), 100);
    s.mark_projectiles(400);
    s.pause(600);
    s.pause(700); // already paused, ignored
    assert_eq!(s.resume(2_600), 2_000);
    assert!(!s.is_paused());
    assert_eq!(s.last_projectile_move(), 2_400);
    assert_eq!(s.last_asteroid_move(), 2_100);
    assert_eq!(s.resume(3_000), 0);
}

// ── Stepping ──────────────────────────────────────────────────────────────────

#[test]
fn command_applied_before_any_advance_is_due() {
    let mut rig = Rig::new();
    rig.input.push_button(Button::B3);
    assert_eq!(rig.step_at(1), StepOutcome::Running);
    assert_eq!(rig.session.state.base_position, 2);
}

#[test]
fn one_command_per_step() {
    let mut rig = Rig::new();
    rig.input.push_button(Button::B3);
    rig.input.push_button(Button::B3);
    rig.step_at(1);
    assert_eq!(rig.session.state.base_position, 2);
    rig.step_at(2);
    assert_eq!(rig.session.state.base_position, 1);
}

#[test]
fn fire_from_serial_space() {
    let mut rig = Rig::new();
    rig.input.push_byte(b' ');
    rig.step_at(1);
    assert_eq!(rig.projectile(), Position::new(3, 2));
}

#[test]
fn advances_follow_their_own_cadence() {
    let mut rig = Rig::new();
    rig.session.state.projectiles.push(Position::new(0, 4)).unwrap();
    rig.session.state.asteroids.push(Position::new(6, 10)).unwrap();

    rig.step_at(499);
    assert_eq!(rig.projectile(), Position::new(0, 4));
    rig.step_at(500);
    assert_eq!(rig.projectile(), Position::new(0, 5));
    assert_eq!(rig.session.state.asteroids[0], Position::new(6, 10));
    rig.step_at(999);
    assert_eq!(rig.projectile(), Position::new(0, 5));
    rig.step_at(1000);
    assert_eq!(rig.projectile(), Position::new(0, 6));
    assert_eq!(rig.session.state.asteroids[0], Position::new(6, 9));
}

#[test]
fn cadence_quickens_once_score_reaches_threshold() {
    let mut rig = Rig::new();
    rig.session.scores.add_score(10);
    rig.session.state.projectiles.push(Position::new(0, 4)).unwrap();
    rig.step_at(489);
    assert_eq!(rig.projectile(), Position::new(0, 4));
    rig.step_at(490);
    assert_eq!(rig.projectile(), Position::new(0, 5));
}

#[test]
fn custom_timing_is_honoured() {
    let mut config = GameConfig::default();
    config.timing.projectile_interval_ms = 200;
    let mut rig = Rig::with_config(&config);
    rig.session.state.projectiles.push(Position::new(0, 4)).unwrap();
    rig.step_at(200);
    assert_eq!(rig.projectile(), Position::new(0, 5));
}

// ── Pause ─────────────────────────────────────────────────────────────────────

#[test]
fn pause_freezes_field_and_resume_does_not_catch_up() {
    let mut rig = Rig::new();
    rig.session.state.projectiles.push(Position::new(0, 4)).unwrap();

    rig.input.push_byte(b'p');
    assert_eq!(rig.step_at(100), StepOutcome::Paused);
    assert!(rig.game_loop.scheduler().is_paused());

    assert_eq!(rig.step_at(10_000), StepOutcome::Paused);
    assert_eq!(rig.projectile(), Position::new(0, 4));

    rig.input.push_byte(b'p');
    assert_eq!(rig.step_at(10_000), StepOutcome::Running);
    assert_eq!(rig.projectile(), Position::new(0, 4));

    rig.step_at(10_399);
    assert_eq!(rig.projectile(), Position::new(0, 4));
    rig.step_at(10_400);
    assert_eq!(rig.projectile(), Position::new(0, 5));
}

#[test]
fn moves_are_ignored_while_paused() {
    let mut rig = Rig::new();
    rig.input.push_byte(b'p');
    rig.step_at(1);
    rig.input.push_byte(b'l');
    rig.input.push_button(Button::B2);
    assert_eq!(rig.step_at(2), StepOutcome::Paused);
    assert_eq!(rig.step_at(3), StepOutcome::Paused);
    assert_eq!(rig.session.state.base_position, 3);
    assert!(rig.session.state.projectiles.is_empty());
}

#[test]
fn down_command_resumes() {
    let mut rig = Rig::new();
    rig.input.push_byte(b'P');
    rig.step_at(1);
    rig.input.push_button(Button::B1);
    assert_eq!(rig.step_at(50), StepOutcome::Running);
    assert!(!rig.game_loop.scheduler().is_paused());
}

#[test]
fn down_command_does_nothing_while_running() {
    let mut rig = Rig::new();
    rig.input.push_bytes(&[0x1b, b'[', b'B']);
    for t in 1..=3 {
        assert_eq!(rig.step_at(t), StepOutcome::Running);
    }
    assert!(!rig.game_loop.scheduler().is_paused());
    assert_eq!(rig.session.state, GameState::new());
}

// ── Stick ─────────────────────────────────────────────────────────────────────

#[test]
fn stick_is_sampled_after_an_advance() {
    let mut rig = Rig::new();
    rig.input.set_stick(Some(StickSample { x: 0, y: 510 }));
    rig.step_at(499);
    assert_eq!(rig.session.state.base_position, 3);
    rig.step_at(500);
    assert_eq!(rig.session.state.base_position, 2);
}

#[test]
fn stick_pushed_up_fires() {
    let mut rig = Rig::new();
    rig.input.set_stick(Some(StickSample { x: 522, y: 1023 }));
    rig.step_at(500);
    assert_eq!(rig.session.state.projectiles.len(), 1);
    assert_eq!(rig.projectile(), Position::new(3, 2));
}

#[test]
fn centred_stick_does_nothing() {
    let mut rig = Rig::new();
    rig.input.set_stick(Some(StickSample::CENTRE));
    rig.step_at(1000);
    assert_eq!(rig.session.state, GameState::new());
}

// ── Game over ─────────────────────────────────────────────────────────────────

fn one_life_left(rig: &mut Rig) {
    for _ in 0..3 {
        rig.session.scores.decrement_life();
    }
    rig.session.state.asteroids.push(Position::new(3, 2)).unwrap();
}

#[test]
fn step_reports_game_over_and_then_does_nothing() {
    let mut rig = Rig::new();
    one_life_left(&mut rig);
    assert_eq!(rig.step_at(1000), StepOutcome::GameOver);
    assert_eq!(rig.session.scores.lives(), 0);

    let frozen = rig.session.state.clone();
    rig.input.push_button(Button::B0);
    assert_eq!(rig.step_at(5000), StepOutcome::GameOver);
    assert_eq!(rig.session.state, frozen);
}

#[test]
fn run_returns_final_score() {
    let mut rig = Rig::new();
    one_life_left(&mut rig);
    rig.session.scores.add_score(12);
    let clock = &rig.clock;
    let outcome = rig.game_loop.run(
        &mut rig.session,
        clock,
        &mut rig.input,
        &mut rig.fb,
        &mut rig.rng,
        || {
            clock.advance(1);
            ControlFlow::Continue(())
        },
    );
    // Score 12 shortens the asteroid interval to 976 ms.
    assert_eq!(outcome, RunOutcome::GameOver { score: 12 });
    assert!(clock.now() >= 976);
}

#[test]
fn run_stops_when_idle_breaks() {
    let mut rig = Rig::new();
    let outcome = rig.game_loop.run(
        &mut rig.session,
        &rig.clock,
        &mut rig.input,
        &mut rig.fb,
        &mut rig.rng,
        || ControlFlow::Break(()),
    );
    assert_eq!(outcome, RunOutcome::Aborted);
}

// ── Whole sessions ────────────────────────────────────────────────────────────

#[test]
fn play_session_starts_from_fresh_score_lives_and_field() {
    let config = GameConfig::default();
    let clock = ManualClock::new(0);
    let mut input = QueuedInput::new();
    let mut fb = FrameBuffer::new();
    let mut rng = StdRng::seed_from_u64(11);
    let mut session = GameSession::default();
    session.scores.add_score(5);
    session.scores.decrement_life();
    session.state.game_over = true;

    let outcome = play_session(&config, &mut session, &clock, &mut input, &mut fb, &mut rng, || {
        ControlFlow::Break(())
    });
    assert_eq!(outcome, RunOutcome::Aborted);
    assert_eq!(session.scores.score(), 0);
    assert_eq!(session.scores.lives(), 4);
    assert!(!session.state.game_over);
    assert_eq!(session.state.asteroids.len(), MAX_ASTEROIDS);
    assert_eq!(fb.clears(), 1);
}

#[test]
fn unattended_base_eventually_loses_every_life() {
    let config = GameConfig::default();
    let clock = ManualClock::new(0);
    let mut input = QueuedInput::new();
    let mut fb = FrameBuffer::new();
    let mut rng = StdRng::seed_from_u64(5);
    let mut session = GameSession::default();

    let outcome = play_session(&config, &mut session, &clock, &mut input, &mut fb, &mut rng, || {
        clock.advance(1);
        if clock.now() > 10_000_000 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(outcome, RunOutcome::GameOver { score: 0 });
    assert_eq!(session.scores.lives(), 0);
}
