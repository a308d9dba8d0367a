//! Game state engine.
//!
//! Every operation mutates a [`GameSession`] in place and mirrors the change
//! onto a [`DisplaySink`]. Randomness comes through an injected `Rng` so
//! callers control determinism (tests use a seeded RNG).
//!
//! Redrawing goes through [`refresh_cell`]: after any entity leaves or enters
//! a cell, the cell is repainted with whatever now occupies it (asteroid,
//! then projectile, then base, else black). Overlapping entities therefore
//! never leave holes in the picture.

use heapless::Vec;
use rand::Rng;

use crate::entities::{
    Direction, GameSession, GameState, Position, ASTEROID_MIN_START_ROW, ASTEROID_SPAWN_ROW,
    BASE_ROW, BASE_START, BASE_TIP_ROW, FIELD_CELLS, FIELD_HEIGHT, FIELD_WIDTH, MAX_ASTEROIDS,
    MAX_PROJECTILES, PROJECTILE_EXIT_ROW, PROJECTILE_SPAWN_ROW,
};
use crate::matrix::{
    draw_cell, Colour, DisplaySink, COLOUR_ASTEROID, COLOUR_BASE, COLOUR_BASE_HIT,
    COLOUR_EXPLOSION, COLOUR_PROJECTILE,
};

// ── Queries ───────────────────────────────────────────────────────────────────

/// Index of the asteroid at `pos`, if any.
pub fn asteroid_at(state: &GameState, pos: Position) -> Option<usize> {
    state.asteroids.iter().position(|&a| a == pos)
}

/// Index of the projectile at `pos`, if any.
pub fn projectile_at(state: &GameState, pos: Position) -> Option<usize> {
    state.projectiles.iter().position(|&p| p == pos)
}

/// Cells covered by a base centred on column `centre`: three across the base
/// row (clipped to the field) and the tip above the centre.
pub fn base_cells(centre: i32) -> impl Iterator<Item = Position> {
    (centre - 1..=centre + 1)
        .map(|x| Position::new(x, BASE_ROW))
        .chain(std::iter::once(Position::new(centre, BASE_TIP_ROW)))
        .filter(Position::is_valid)
}

pub fn base_occupies(state: &GameState, pos: Position) -> bool {
    base_cells(state.base_position).any(|cell| cell == pos)
}

/// True if an asteroid arriving at `pos` strikes the base.
pub fn hits_base(state: &GameState, pos: Position) -> bool {
    pos.y == BASE_TIP_ROW && (pos.x - state.base_position).abs() <= 1
}

pub fn is_game_over(session: &GameSession) -> bool {
    session.state.game_over
}

pub fn set_game_over(session: &mut GameSession, over: bool) {
    session.state.game_over = over;
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

/// Colour a cell should show given everything currently on the field.
pub fn cell_colour(state: &GameState, pos: Position) -> Colour {
    if asteroid_at(state, pos).is_some() {
        COLOUR_ASTEROID
    } else if projectile_at(state, pos).is_some() {
        COLOUR_PROJECTILE
    } else if base_occupies(state, pos) {
        COLOUR_BASE
    } else {
        Colour::Black
    }
}

/// Repaint one cell from the current state.
pub fn refresh_cell<D: DisplaySink + ?Sized>(state: &GameState, display: &mut D, pos: Position) {
    draw_cell(display, pos, cell_colour(state, pos));
}

/// Clear the matrix and draw the base, every asteroid and every projectile.
pub fn redraw_whole_display<D: DisplaySink + ?Sized>(state: &GameState, display: &mut D) {
    display.clear();
    for cell in base_cells(state.base_position) {
        draw_cell(display, cell, COLOUR_BASE);
    }
    for &asteroid in &state.asteroids {
        draw_cell(display, asteroid, COLOUR_ASTEROID);
    }
    for &projectile in &state.projectiles {
        draw_cell(display, projectile, COLOUR_PROJECTILE);
    }
}

/// Orange burst around a destroyed asteroid: three cells across the row
/// above the hit and one cell above that. Cells are repainted afterwards.
fn play_destruction_animation<D: DisplaySink + ?Sized>(
    state: &GameState,
    display: &mut D,
    at: Position,
) {
    let burst = [
        Position::new(at.x - 1, at.y + 1),
        Position::new(at.x, at.y + 1),
        Position::new(at.x + 1, at.y + 1),
        Position::new(at.x, at.y + 2),
    ];
    flash_cells(state, display, &burst, COLOUR_EXPLOSION);
}

/// Red flash across the base tip row and the cell above the tip.
fn play_base_hit_feedback<D: DisplaySink + ?Sized>(state: &GameState, display: &mut D) {
    let centre = state.base_position;
    let flash = [
        Position::new(centre - 1, BASE_TIP_ROW),
        Position::new(centre, BASE_TIP_ROW),
        Position::new(centre + 1, BASE_TIP_ROW),
        Position::new(centre, BASE_TIP_ROW + 1),
    ];
    flash_cells(state, display, &flash, COLOUR_BASE_HIT);
}

fn flash_cells<D: DisplaySink + ?Sized>(
    state: &GameState,
    display: &mut D,
    cells: &[Position],
    colour: Colour,
) {
    for &cell in cells {
        draw_cell(display, cell, colour);
    }
    display.frame_pause();
    for &cell in cells {
        refresh_cell(state, display, cell);
    }
    display.frame_pause();
}

// ── Removal ───────────────────────────────────────────────────────────────────

/// Remove projectile `index`, shifting the later projectiles down one slot.
fn remove_projectile<D: DisplaySink + ?Sized>(state: &mut GameState, display: &mut D, index: usize) {
    if index >= state.projectiles.len() {
        return;
    }
    let removed = state.projectiles[index];
    state.projectiles.copy_within(index + 1.., index);
    state.projectiles.pop();
    refresh_cell(state, display, removed);
}

/// Remove asteroid `index` by moving the last asteroid into its slot.
fn remove_asteroid<D: DisplaySink + ?Sized>(state: &mut GameState, display: &mut D, index: usize) {
    if index >= state.asteroids.len() {
        return;
    }
    let removed = state.asteroids.swap_remove(index);
    refresh_cell(state, display, removed);
}

// ── Random placement ──────────────────────────────────────────────────────────

/// Pick a top-row column with no asteroid in it, other than `avoid`.
/// Chooses uniformly among the free columns, so it always terminates.
fn random_free_top_column(state: &GameState, rng: &mut impl Rng, avoid: Option<i32>) -> Option<i32> {
    let free: Vec<i32, { FIELD_WIDTH as usize }> = (0..FIELD_WIDTH)
        .filter(|&x| Some(x) != avoid)
        .filter(|&x| asteroid_at(state, Position::new(x, ASTEROID_SPAWN_ROW)).is_none())
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}

/// Pick a free cell for an initial asteroid, away from the bottom rows.
fn random_free_start_cell(state: &GameState, rng: &mut impl Rng) -> Option<Position> {
    let free: Vec<Position, FIELD_CELLS> = (ASTEROID_MIN_START_ROW..FIELD_HEIGHT)
        .flat_map(|y| (0..FIELD_WIDTH).map(move |x| Position::new(x, y)))
        .filter(|&pos| asteroid_at(state, pos).is_none())
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}

/// Add a fresh asteroid on the top row.
fn spawn_asteroid<D: DisplaySink + ?Sized>(state: &mut GameState, display: &mut D, rng: &mut impl Rng) {
    let Some(column) = random_free_top_column(state, rng, None) else {
        log::warn!("top row full, replacement asteroid skipped");
        return;
    };
    let pos = Position::new(column, ASTEROID_SPAWN_ROW);
    if state.asteroids.push(pos).is_err() {
        log::warn!("asteroid capacity reached, replacement skipped");
        return;
    }
    refresh_cell(state, display, pos);
}

// ── Session setup ─────────────────────────────────────────────────────────────

/// Reset the field: base centred, no projectiles, a full set of asteroids
/// at distinct random cells clear of the lowest rows. Redraws everything.
/// Score and lives are left alone; see [`new_game`].
pub fn initialise<D: DisplaySink + ?Sized>(
    session: &mut GameSession,
    display: &mut D,
    rng: &mut impl Rng,
) {
    let state = &mut session.state;
    state.base_position = BASE_START;
    state.projectiles.clear();
    state.asteroids.clear();
    state.game_over = false;

    while state.asteroids.len() < MAX_ASTEROIDS {
        let Some(pos) = random_free_start_cell(state, rng) else {
            log::warn!("no free cell for asteroid {}", state.asteroids.len());
            break;
        };
        // Capacity is checked by the loop condition.
        let _ = state.asteroids.push(pos);
    }

    redraw_whole_display(state, display);
    log::debug!("field initialised with {} asteroids", state.asteroids.len());
}

/// Start a new session: reset score and lives, then initialise the field.
pub fn new_game<D: DisplaySink + ?Sized>(
    session: &mut GameSession,
    display: &mut D,
    rng: &mut impl Rng,
) {
    session.scores.reset();
    initialise(session, display, rng);
    log::info!("new game started");
}

// ── Input-driven operations ───────────────────────────────────────────────────

/// Move the base one column. Returns `false` (and changes nothing) if the
/// base is already against that edge of the field.
pub fn move_base<D: DisplaySink + ?Sized>(
    session: &mut GameSession,
    direction: Direction,
    display: &mut D,
) -> bool {
    let state = &mut session.state;
    let old = state.base_position;
    let new = old + direction.offset();
    if !(0..FIELD_WIDTH).contains(&new) {
        return false;
    }
    state.base_position = new;
    for cell in base_cells(old).chain(base_cells(new)) {
        refresh_cell(state, display, cell);
    }
    true
}

/// Fire a projectile from the base tip. Fails when the maximum number of
/// projectiles is in flight or one is still sitting in the spawn cell.
pub fn fire_projectile<D: DisplaySink + ?Sized>(session: &mut GameSession, display: &mut D) -> bool {
    let state = &mut session.state;
    let spawn = Position::new(state.base_position, PROJECTILE_SPAWN_ROW);
    if state.projectiles.len() >= MAX_PROJECTILES || projectile_at(state, spawn).is_some() {
        return false;
    }
    if state.projectiles.push(spawn).is_err() {
        return false;
    }
    refresh_cell(state, display, spawn);
    true
}

// ── Timed advances ────────────────────────────────────────────────────────────

/// Move every projectile up one row.
///
/// A projectile reaching the top row leaves the field. One that moves onto
/// an asteroid destroys it (+1 score) and a replacement asteroid enters on
/// the top row. Removals shift later projectiles down, so the index only
/// advances after a plain move.
pub fn advance_projectiles<D: DisplaySink + ?Sized>(
    session: &mut GameSession,
    display: &mut D,
    rng: &mut impl Rng,
) {
    let GameSession { state, scores } = session;
    let mut index = 0;
    while index < state.projectiles.len() {
        let current = state.projectiles[index];
        let next = current.above();

        if next.y == PROJECTILE_EXIT_ROW {
            remove_projectile(state, display, index);
            continue;
        }

        if let Some(hit) = asteroid_at(state, next) {
            remove_asteroid(state, display, hit);
            remove_projectile(state, display, index);
            scores.add_score(1);
            log::debug!("projectile destroyed asteroid at {next:?}, score {}", scores.score());
            play_destruction_animation(state, display, next);
            spawn_asteroid(state, display, rng);
            continue;
        }

        state.projectiles[index] = next;
        refresh_cell(state, display, current);
        refresh_cell(state, display, next);
        index += 1;
    }
}

/// Move every asteroid down one row.
///
/// An asteroid that would drop onto the base row re-enters on the top row in
/// a different column. Otherwise, arriving on the base tip row beside the
/// base costs a life, and arriving on a projectile destroys that projectile
/// (+1 score) and sends the asteroid back to the top row.
///
/// Asteroids bound for the top row are lifted off the field during the pass
/// and placed once every asteroid has moved, so an asteroid still waiting to
/// leave the top row never blocks a column.
pub fn advance_asteroids<D: DisplaySink + ?Sized>(
    session: &mut GameSession,
    display: &mut D,
    rng: &mut impl Rng,
) {
    let GameSession { state, scores } = session;
    let mut reentries: Reentries = Vec::new();

    for index in 0..state.asteroids.len() {
        let current = state.asteroids[index];
        let next = current.below();

        if next.y <= BASE_ROW {
            lift_off_field(state, display, index);
            // At most one entry per asteroid.
            let _ = reentries.push((index, Some(current.x)));
            continue;
        }

        if hits_base(state, next) {
            play_base_hit_feedback(state, display);
            let out_of_lives = scores.decrement_life();
            log::debug!("base hit at {next:?}, {} lives left", scores.lives());
            if out_of_lives {
                state.game_over = true;
                log::info!("game over, final score {}", scores.score());
            }
        }

        if let Some(shot) = projectile_at(state, next) {
            remove_projectile(state, display, shot);
            scores.add_score(1);
            log::debug!("asteroid ran into projectile at {next:?}, score {}", scores.score());
            play_destruction_animation(state, display, next);
            lift_off_field(state, display, index);
            let _ = reentries.push((index, None));
        } else {
            state.asteroids[index] = next;
            refresh_cell(state, display, current);
            refresh_cell(state, display, next);
        }
    }

    reenter_top_row(state, display, rng, &reentries);
}

/// Asteroid indices waiting to re-enter, each with a column to stay out of.
type Reentries = Vec<(usize, Option<i32>), MAX_ASTEROIDS>;

/// Take asteroid `index` off the field until it re-enters.
fn lift_off_field<D: DisplaySink + ?Sized>(state: &mut GameState, display: &mut D, index: usize) {
    let current = state.asteroids[index];
    state.asteroids[index] = Position::INVALID;
    refresh_cell(state, display, current);
}

/// Place lifted asteroids on free top-row columns. Walks the entries from
/// the highest index down so a swap removal never moves a waiting asteroid.
fn reenter_top_row<D: DisplaySink + ?Sized>(
    state: &mut GameState,
    display: &mut D,
    rng: &mut impl Rng,
    reentries: &[(usize, Option<i32>)],
) {
    for &(index, avoid) in reentries.iter().rev() {
        match random_free_top_column(state, rng, avoid) {
            Some(column) => {
                let pos = Position::new(column, ASTEROID_SPAWN_ROW);
                state.asteroids[index] = pos;
                refresh_cell(state, display, pos);
            }
            None => {
                log::warn!("top row full, asteroid {index} dropped");
                remove_asteroid(state, display, index);
            }
        }
    }
}
