mod display;
mod keyboard;

use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    style::Color,
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use led_asteroids::clock::{TickClock, Ticker};
use led_asteroids::presentation::{game_over_visual, Banner, GAME_OVER_BANNER, SPLASH_BANNER};
use led_asteroids::score::ScoreBoard;
use led_asteroids::session::{play_session, RunOutcome};
use led_asteroids::status::StatusLatch;
use led_asteroids::{GameConfig, GameSession, Result};

use display::TerminalMatrix;
use keyboard::KeyboardInput;

/// Pause between loop iterations; keeps the loop polling without spinning.
const IDLE: Duration = Duration::from_millis(1);

/// Banner scroll speed.
const SCROLL_STEP: Duration = Duration::from_millis(150);
const BANNER_WIDTH: usize = 16;

#[derive(Parser)]
#[command(name = "led_asteroids")]
#[command(about = "Asteroid defence on an emulated LED matrix", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (the terminal is taken over by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let default_filter = if log_file.is_some() { "info" } else { "off" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if let Some(path) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.try_init()?;
    Ok(())
}

// ── Screens ───────────────────────────────────────────────────────────────────

/// Scroll `text` under the matrix until a key is pressed. Returns `false` if
/// the player asked to quit instead.
fn scroll_until_key(
    display: &mut TerminalMatrix<BufWriter<Stdout>>,
    input: &mut KeyboardInput,
    text: &str,
    colour: Color,
) -> Result<bool> {
    let mut banner = Banner::new(text, BANNER_WIDTH);
    // Presses made during play must not dismiss the screen.
    input.clear();
    loop {
        display.show_banner(&banner.frame(), colour);
        display.take_error()?;
        thread::sleep(SCROLL_STEP);
        if input.take_any_press() {
            return Ok(!input.quit_requested());
        }
        if !banner.advance() {
            banner.restart();
        }
    }
}

fn splash_screen(
    display: &mut TerminalMatrix<BufWriter<Stdout>>,
    input: &mut KeyboardInput,
) -> Result<bool> {
    display.show_text(&[
        ("Asteroids", Color::Cyan),
        ("Defend the base: shoot the falling asteroids", Color::White),
        ("Press any key to start", Color::DarkGrey),
    ]);
    scroll_until_key(display, input, SPLASH_BANNER, Color::Green)
}

fn game_over_screen(
    display: &mut TerminalMatrix<BufWriter<Stdout>>,
    input: &mut KeyboardInput,
    score: u32,
) -> Result<bool> {
    game_over_visual(display);
    let score_line = format!("Final score: {score}");
    display.show_text(&[
        ("GAME OVER", Color::Red),
        (&score_line, Color::Yellow),
        ("Press a button to start again", Color::White),
    ]);
    scroll_until_key(display, input, GAME_OVER_BANNER, Color::Red)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let mut out = stdout();
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events so held stick keys end promptly.
    // Terminals without the kitty protocol fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread to blocking event reads so the game loop never
    // blocks on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&config, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run(config: &GameConfig, rx: &mpsc::Receiver<Event>) -> Result<()> {
    let clock = TickClock::new();
    let status = Arc::new(StatusLatch::new());
    let _ticker = Ticker::spawn(clock.clone(), Arc::clone(&status))?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut display = TerminalMatrix::new(
        BufWriter::new(stdout()),
        Arc::clone(&status),
        Duration::from_millis(config.animation_step_ms),
    );
    let mut input = KeyboardInput::new(rx);
    let quit = input.quit_flag();
    let mut session = GameSession::new(ScoreBoard::with_status(Arc::clone(&status)));

    log::info!("LED Asteroids starting (seed: {:?})", config.seed);
    if !splash_screen(&mut display, &mut input)? {
        return Ok(());
    }

    loop {
        input.clear();
        let outcome = play_session(
            config,
            &mut session,
            &clock,
            &mut input,
            &mut display,
            &mut rng,
            || {
                thread::sleep(IDLE);
                if quit.load(Ordering::Acquire) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        display.take_error()?;

        match outcome {
            RunOutcome::Aborted => return Ok(()),
            RunOutcome::GameOver { score } => {
                if !game_over_screen(&mut display, &mut input, score)? {
                    return Ok(());
                }
            }
        }
    }
}
