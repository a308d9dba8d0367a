//! Session loop.
//!
//! Drives the game state engine from a clock and an input source. Input is
//! applied as soon as it arrives; projectiles and asteroids advance on two
//! independent cadences which both quicken as the score grows. Pausing
//! freezes both cadences, and on resume they are shifted by the paused time
//! so nothing fires to "catch up".

use std::ops::ControlFlow;

use rand::Rng;

use crate::clock::Clock;
use crate::compute::{
    advance_asteroids, advance_projectiles, fire_projectile, is_game_over, move_base, new_game,
};
use crate::config::{GameConfig, JoystickConfig, TimingConfig};
use crate::entities::{Direction, GameSession};
use crate::input::{Command, InputSource};
use crate::matrix::DisplaySink;

// ── Cadence policy ────────────────────────────────────────────────────────────

/// Interval for a cadence that starts at `base` and loses `step` ms per
/// point once `score` reaches `threshold`, never dropping below `min`.
fn scaled_interval(base: u64, step: u64, min: u64, threshold: u32, score: u32) -> u64 {
    if score < threshold {
        return base;
    }
    base.saturating_sub(step.saturating_mul(score as u64)).max(min)
}

/// The two advance timers and the pause state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduler {
    timing: TimingConfig,
    last_projectile_move: u64,
    last_asteroid_move: u64,
    paused_at: Option<u64>,
}

impl Scheduler {
    pub fn new(timing: TimingConfig, now: u64) -> Self {
        Self {
            timing,
            last_projectile_move: now,
            last_asteroid_move: now,
            paused_at: None,
        }
    }

    pub fn projectile_interval(&self, score: u32) -> u64 {
        let t = &self.timing;
        scaled_interval(
            t.projectile_interval_ms,
            t.projectile_step_ms,
            t.min_projectile_interval_ms,
            t.speedup_threshold,
            score,
        )
    }

    pub fn asteroid_interval(&self, score: u32) -> u64 {
        let t = &self.timing;
        scaled_interval(
            t.asteroid_interval_ms,
            t.asteroid_step_ms,
            t.min_asteroid_interval_ms,
            t.speedup_threshold,
            score,
        )
    }

    pub fn projectiles_due(&self, now: u64, score: u32) -> bool {
        !self.is_paused()
            && now.saturating_sub(self.last_projectile_move) >= self.projectile_interval(score)
    }

    pub fn asteroids_due(&self, now: u64, score: u32) -> bool {
        !self.is_paused()
            && now.saturating_sub(self.last_asteroid_move) >= self.asteroid_interval(score)
    }

    pub fn mark_projectiles(&mut self, now: u64) {
        self.last_projectile_move = now;
    }

    pub fn mark_asteroids(&mut self, now: u64) {
        self.last_asteroid_move = now;
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, now: u64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Leave the paused state, shifting both timers by the time spent
    /// paused. Returns that duration.
    pub fn resume(&mut self, now: u64) -> u64 {
        let Some(paused_at) = self.paused_at.take() else {
            return 0;
        };
        let paused_for = now.saturating_sub(paused_at);
        self.last_projectile_move = self.last_projectile_move.saturating_add(paused_for);
        self.last_asteroid_move = self.last_asteroid_move.saturating_add(paused_for);
        paused_for
    }

    pub fn last_projectile_move(&self) -> u64 {
        self.last_projectile_move
    }

    pub fn last_asteroid_move(&self) -> u64 {
        self.last_asteroid_move
    }
}

// ── Loop ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    GameOver { score: u32 },
    /// The idle hook asked to stop before the game ended.
    Aborted,
}

pub struct SessionLoop {
    scheduler: Scheduler,
    joystick: JoystickConfig,
}

impl SessionLoop {
    /// Seed both timers at `now`.
    pub fn start(config: &GameConfig, now: u64) -> Self {
        Self {
            scheduler: Scheduler::new(config.timing.clone(), now),
            joystick: config.joystick.clone(),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// One pass of the loop: poll input, apply at most one command, then run
    /// whichever advances are due.
    pub fn step<C, I, D, R>(
        &mut self,
        session: &mut GameSession,
        clock: &C,
        input: &mut I,
        display: &mut D,
        rng: &mut R,
    ) -> StepOutcome
    where
        C: Clock + ?Sized,
        I: InputSource + ?Sized,
        D: DisplaySink + ?Sized,
        R: Rng,
    {
        if is_game_over(session) {
            return StepOutcome::GameOver;
        }

        let now = clock.now();
        let command = input.poll();

        if self.scheduler.is_paused() {
            if !matches!(command, Some(Command::PauseToggle | Command::Down)) {
                return StepOutcome::Paused;
            }
            let paused_for = self.scheduler.resume(now);
            log::info!("resumed after {paused_for} ms");
        } else if let Some(command) = command {
            match command {
                Command::MoveLeft => {
                    move_base(session, Direction::Left, display);
                }
                Command::MoveRight => {
                    move_base(session, Direction::Right, display);
                }
                Command::Fire => {
                    fire_projectile(session, display);
                }
                Command::PauseToggle => {
                    self.scheduler.pause(now);
                    log::info!("paused at {now} ms");
                    display.present();
                    return StepOutcome::Paused;
                }
                Command::Down => {}
            }
        }

        if !is_game_over(session) && self.scheduler.projectiles_due(now, session.scores.score()) {
            advance_projectiles(session, display, rng);
            self.apply_stick(session, input, display);
            self.scheduler.mark_projectiles(now);
        }

        if !is_game_over(session) && self.scheduler.asteroids_due(now, session.scores.score()) {
            advance_asteroids(session, display, rng);
            self.apply_stick(session, input, display);
            self.scheduler.mark_asteroids(now);
        }

        display.present();

        if is_game_over(session) {
            StepOutcome::GameOver
        } else {
            StepOutcome::Running
        }
    }

    /// Sample the stick once and act on any deflection.
    fn apply_stick<I, D>(&self, session: &mut GameSession, input: &mut I, display: &mut D)
    where
        I: InputSource + ?Sized,
        D: DisplaySink + ?Sized,
    {
        let Some(sample) = input.poll_stick() else {
            return;
        };
        match self.joystick.horizontal(sample) {
            Some(Command::MoveLeft) => {
                move_base(session, Direction::Left, display);
            }
            Some(Command::MoveRight) => {
                move_base(session, Direction::Right, display);
            }
            _ => {}
        }
        if self.joystick.fires(sample) {
            fire_projectile(session, display);
        }
    }

    /// Step until the game ends. `idle` runs between steps; returning
    /// `ControlFlow::Break` abandons the session.
    pub fn run<C, I, D, R>(
        &mut self,
        session: &mut GameSession,
        clock: &C,
        input: &mut I,
        display: &mut D,
        rng: &mut R,
        mut idle: impl FnMut() -> ControlFlow<()>,
    ) -> RunOutcome
    where
        C: Clock + ?Sized,
        I: InputSource + ?Sized,
        D: DisplaySink + ?Sized,
        R: Rng,
    {
        loop {
            if self.step(session, clock, input, display, rng) == StepOutcome::GameOver {
                return RunOutcome::GameOver {
                    score: session.scores.score(),
                };
            }
            if idle().is_break() {
                return RunOutcome::Aborted;
            }
        }
    }
}

/// Play one full session: reset score, lives and field, then loop until the
/// game is over.
pub fn play_session<C, I, D, R>(
    config: &GameConfig,
    session: &mut GameSession,
    clock: &C,
    input: &mut I,
    display: &mut D,
    rng: &mut R,
    idle: impl FnMut() -> ControlFlow<()>,
) -> RunOutcome
where
    C: Clock + ?Sized,
    I: InputSource + ?Sized,
    D: DisplaySink + ?Sized,
    R: Rng,
{
    new_game(session, display, rng);
    let mut game_loop = SessionLoop::start(config, clock.now());
    let outcome = game_loop.run(session, clock, input, display, rng, idle);
    log::info!("session ended: {outcome:?}");
    outcome
}
