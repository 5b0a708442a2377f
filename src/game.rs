use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::field::Field;
use crate::piece::{Cell, Piece, PieceProvider, RandomPieceProvider};

// ============================================================================
// Scoring
// ============================================================================

pub const SCORE_SINGLE: u32 = 40;
pub const SCORE_DOUBLE: u32 = 100;
pub const SCORE_TRIPLE: u32 = 300;
pub const SCORE_TETRIS: u32 = 1200;

/// Points for clearing `rows` rows with one piece. Anything past four
/// scores as four.
pub fn score_for_rows(rows: u32) -> u32 {
    match rows.min(4) {
        0 => 0,
        1 => SCORE_SINGLE,
        2 => SCORE_DOUBLE,
        3 => SCORE_TRIPLE,
        _ => SCORE_TETRIS,
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    field: Field,
    current_piece: Piece,
    score: u32,
    lines_cleared: u32,
    state: GameState,
    config: Config,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

/// Starts a session on a `columns` x `rows` field with random shapes and
/// the default gravity interval.
pub fn spawn_new_session(columns: usize, rows: usize) -> Result<Game> {
    Game::new(Config::new(columns, rows)?)
}

impl Game {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_provider(config, Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(config: Config, mut provider: Box<dyn PieceProvider>) -> Result<Self> {
        let config = config.validated()?;
        let field = Field::new(config.columns, config.rows)?;
        let current_piece = Piece::spawn(provider.as_mut(), config.columns);

        let mut game = Self {
            field,
            current_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Running,
            config,
            piece_provider: provider,
            events: Vec::new(),
        };
        game.check_spawn();
        Ok(game)
    }

    /// Session over a prepared field with `current_piece` already in play.
    /// Later pieces come from `provider`.
    pub fn with_field(field: Field, current_piece: Piece, provider: Box<dyn PieceProvider>) -> Self {
        let config = Config {
            columns: field.columns(),
            rows: field.rows(),
            ..Config::default()
        };
        let mut game = Self {
            field,
            current_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Running,
            config,
            piece_provider: provider,
            events: Vec::new(),
        };
        game.check_spawn();
        game
    }

    fn check_spawn(&mut self) {
        if self.field.check_collision(&self.current_piece) {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    fn spawn_next_piece(&mut self) {
        self.current_piece = Piece::spawn(self.piece_provider.as_mut(), self.config.columns);
        self.check_spawn();
    }

    fn add_score(&mut self, rows: u32) {
        self.score += score_for_rows(rows);
        self.lines_cleared += rows;
    }

    /// Moves the piece sideways by `delta` columns, clamped to the field.
    /// Returns whether the piece ended up somewhere new.
    pub fn move_horizontal(&mut self, delta: i32) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let max_x = self.config.columns as i32 - self.current_piece.width() as i32;
        let x = (self.current_piece.x + delta).max(0).min(max_x);
        let candidate = self.current_piece.shift(x - self.current_piece.x, 0);
        if self.field.check_collision(&candidate) || candidate == self.current_piece {
            return false;
        }
        self.current_piece = candidate;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Rotates the piece clockwise in place; blocked rotations are dropped.
    pub fn rotate(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let rotated = self.current_piece.rotate();
        if self.field.check_collision(&rotated) {
            return false;
        }
        self.current_piece = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    pub fn soft_drop(&mut self) {
        self.step_down();
    }

    /// Gravity: same step as a soft drop, driven by the timer.
    pub fn tick(&mut self) {
        self.step_down();
    }

    fn step_down(&mut self) {
        if self.state != GameState::Running {
            return;
        }
        self.current_piece.y += 1;
        if !self.field.check_collision(&self.current_piece) {
            self.events.push(GameEvent::PieceMoved);
            return;
        }

        self.field.merge_piece(&self.current_piece);
        self.events.push(GameEvent::PieceLocked);

        let rows = self.field.detect_and_remove_full_rows();
        if rows > 0 {
            self.events.push(GameEvent::LinesCleared(rows));
        }
        self.add_score(rows);
        self.spawn_next_piece();
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Running => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Running;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::GameOver => {}
        }
    }

    /// Starts over on an empty field. Only honored once the game is over.
    pub fn restart(&mut self) {
        if self.state != GameState::GameOver {
            return;
        }
        self.field.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.state = GameState::Running;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);
        self.spawn_next_piece();
    }

    /// Ends the session and hands back the final score.
    pub fn quit(self) -> u32 {
        self.score
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.state == GameState::Paused
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// Returns the visible rows with the current piece overlaid
    pub fn visible_grid(&self) -> Vec<Vec<Cell>> {
        let mut grid = self.field.visible_rows().to_vec();

        for (x, y, value) in self.current_piece.blocks() {
            if x >= 0 && y >= 0 {
                if let Some(cell) = grid.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                    *cell = value;
                }
            }
        }

        grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::piece::{SequencePieceProvider, Shape};

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn empty_field(columns: usize, rows: usize) -> Field {
        Field::new(columns, rows).expect("field dimensions must be non-zero")
    }

    pub fn fill_row(field: &mut Field, y: usize) {
        for x in 0..field.columns() {
            field.set_cell(x, y, Shape::T.color());
        }
    }

    pub fn fill_row_with_gap(field: &mut Field, y: usize, gap_x: usize) {
        for x in 0..field.columns() {
            if x != gap_x {
                field.set_cell(x, y, Shape::T.color());
            }
        }
    }

    pub fn sequence(shapes: &[Shape]) -> Box<dyn PieceProvider> {
        Box::new(SequencePieceProvider::new(shapes.to_vec()))
    }
}
