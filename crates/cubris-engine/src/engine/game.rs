use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    CommandError, ConfigError,
    core::{
        board::{Block, Board},
        piece::{ActivePiece, Anchor, PieceKind, RotationDirection},
    },
};

use super::{config::GameConfig, game_stats::GameStats, piece_buffer::PieceBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

/// Kinematic phase of the active piece.
///
/// A piece is `Falling` while gravity can still move it, and `Locking` once
/// the cell below is blocked: the next [`Game::tick`] settles it into the
/// board, unless a move or rotation frees it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PiecePhase {
    Falling,
    Locking,
}

/// Result of a gravity step or hard drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The active piece moved down one row.
    Fell,
    /// The active piece settled and the next piece spawned.
    Locked { lines_cleared: usize },
    /// The game is over; nothing changed in this call, or the next piece
    /// could not spawn.
    GameOver,
}

impl TickOutcome {
    /// Integer form for front ends: lines cleared (0 when the piece only
    /// fell), or `-1` on game over.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            TickOutcome::Fell => 0,
            TickOutcome::Locked { lines_cleared } => {
                i32::try_from(lines_cleared).unwrap_or(i32::MAX)
            }
            TickOutcome::GameOver => -1,
        }
    }

    #[must_use]
    pub fn lines_cleared(self) -> usize {
        match self {
            TickOutcome::Locked { lines_cleared } => lines_cleared,
            TickOutcome::Fell | TickOutcome::GameOver => 0,
        }
    }
}

/// A discrete input, as forwarded by a front end or stored in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    RotateCw,
    RotateCcw,
    HardDrop,
    Tick,
    Reset,
}

/// The game-state engine.
///
/// `Game` owns the board, the active piece, the piece generator and the
/// statistics. Front ends call [`tick`](Self::tick) on their own schedule,
/// forward inputs to the command methods, and read the composite grid through
/// [`get`](Self::get).
///
/// All methods run to completion synchronously. `Game` does no internal
/// locking; a host sharing it between threads must serialize access itself.
///
/// Once the game is over every command is a no-op until [`reset`](Self::reset).
///
/// # Example
///
/// ```
/// use cubris_engine::{Block, Game, GameConfig};
///
/// let mut game = Game::new(GameConfig::default()).unwrap();
/// let outcome = game.hard_drop();
/// assert!(outcome.is_locked());
/// assert_eq!(game.stats().completed_pieces(), 1);
///
/// let settled = (0..10).filter(|&col| game.get(0, col) != Block::Empty).count();
/// assert!(settled > 0);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    active_piece: Option<ActivePiece>,
    piece_buffer: PieceBuffer,
    stats: GameStats,
    session_state: SessionState,
}

impl Game {
    /// Creates a game and spawns its first piece.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let piece_buffer = config
            .seed
            .map_or_else(PieceBuffer::new, PieceBuffer::with_seed);
        let mut game = Self {
            board: Board::new(config.width, config.height, config.spawn_rows),
            active_piece: None,
            piece_buffer,
            stats: GameStats::new(config.score_table),
            session_state: SessionState::Playing,
            config,
        };
        game.spawn_next();
        Ok(game)
    }

    /// Starts a new game: empty board, zeroed statistics, fresh piece.
    ///
    /// The piece generator keeps its sequence rather than restarting it.
    pub fn reset(&mut self) {
        self.board.reset();
        self.stats = GameStats::new(self.config.score_table);
        self.session_state = SessionState::Playing;
        self.active_piece = None;
        self.spawn_next();
        info!("game reset");
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Settled blocks only, without the active piece.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.stats.total_cleared_lines()
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.stats.level()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.session_state.is_game_over()
    }

    /// The falling piece; `None` only after game over.
    #[must_use]
    pub fn active_piece(&self) -> Option<ActivePiece> {
        self.active_piece
    }

    #[must_use]
    pub fn piece_phase(&self) -> Option<PiecePhase> {
        let piece = self.active_piece?;
        if self.board.fits(&piece.down()) {
            Some(PiecePhase::Falling)
        } else {
            Some(PiecePhase::Locking)
        }
    }

    /// Where the active piece would land on a hard drop.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<ActivePiece> {
        self.active_piece.map(|piece| piece.dropped_on(&self.board))
    }

    /// The piece that spawns after the current one locks.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.piece_buffer.peek_next()
    }

    /// Composite cell: the active piece's block if it covers the cell,
    /// otherwise the settled block.
    ///
    /// Valid rows include the hidden spawn buffer, i.e. `0..height + spawn_rows`.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` lies outside the board.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Block {
        let settled = self.board.get(row, col);
        match self.active_piece {
            Some(piece) if piece.covers(row, col) => Block::Piece(piece.kind()),
            _ => settled,
        }
    }

    fn playing_piece(&self) -> Result<ActivePiece, CommandError> {
        self.active_piece
            .filter(|_| self.session_state.is_playing())
            .ok_or(CommandError::GameOver)
    }

    fn try_replace(&mut self, piece: ActivePiece) -> Result<(), CommandError> {
        if !self.board.fits(&piece) {
            return Err(CommandError::Blocked);
        }
        self.active_piece = Some(piece);
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), CommandError> {
        let piece = self.playing_piece()?;
        self.try_replace(piece.left())
    }

    pub fn try_move_right(&mut self) -> Result<(), CommandError> {
        let piece = self.playing_piece()?;
        self.try_replace(piece.right())
    }

    pub fn try_rotate_cw(&mut self) -> Result<(), CommandError> {
        self.try_rotate(RotationDirection::Clockwise)
    }

    pub fn try_rotate_ccw(&mut self) -> Result<(), CommandError> {
        self.try_rotate(RotationDirection::CounterClockwise)
    }

    fn try_rotate(&mut self, direction: RotationDirection) -> Result<(), CommandError> {
        let piece = self.playing_piece()?;
        let rotated = piece
            .rotated_on(&self.board, direction, self.config.rotation_system)
            .ok_or(CommandError::Blocked)?;
        self.active_piece = Some(rotated);
        Ok(())
    }

    /// Returns true if the piece moved.
    pub fn move_left(&mut self) -> bool {
        self.try_move_left().is_ok()
    }

    /// Returns true if the piece moved.
    pub fn move_right(&mut self) -> bool {
        self.try_move_right().is_ok()
    }

    /// Returns true if the piece rotated.
    pub fn rotate_cw(&mut self) -> bool {
        self.try_rotate_cw().is_ok()
    }

    /// Returns true if the piece rotated.
    pub fn rotate_ccw(&mut self) -> bool {
        self.try_rotate_ccw().is_ok()
    }

    /// Advances one gravity step.
    ///
    /// Moves the active piece down one row, or, when it cannot move, locks
    /// it, clears full rows, updates statistics and spawns the next piece.
    pub fn tick(&mut self) -> TickOutcome {
        let Ok(piece) = self.playing_piece() else {
            return TickOutcome::GameOver;
        };
        let fallen = piece.down();
        if self.board.fits(&fallen) {
            self.active_piece = Some(fallen);
            return TickOutcome::Fell;
        }
        self.lock(piece)
    }

    /// Drops the active piece as far as it goes and locks it immediately.
    pub fn hard_drop(&mut self) -> TickOutcome {
        let Ok(piece) = self.playing_piece() else {
            return TickOutcome::GameOver;
        };
        self.lock(piece.dropped_on(&self.board))
    }

    /// Applies a recorded command. Returns the outcome for commands that
    /// advance the game (`Tick`, `HardDrop`).
    pub fn apply(&mut self, command: Command) -> Option<TickOutcome> {
        match command {
            Command::MoveLeft => {
                self.move_left();
            }
            Command::MoveRight => {
                self.move_right();
            }
            Command::RotateCw => {
                self.rotate_cw();
            }
            Command::RotateCcw => {
                self.rotate_ccw();
            }
            Command::HardDrop => return Some(self.hard_drop()),
            Command::Tick => return Some(self.tick()),
            Command::Reset => self.reset(),
        }
        None
    }

    fn lock(&mut self, piece: ActivePiece) -> TickOutcome {
        self.board.fill_piece(&piece);
        let lines_cleared = self.board.clear_full_rows();
        self.stats.complete_piece_drop(lines_cleared);
        debug!(
            kind = ?piece.kind(),
            anchor = ?piece.anchor(),
            lines_cleared,
            score = self.stats.score(),
            "piece locked"
        );

        if !self.spawn_next() {
            return TickOutcome::GameOver;
        }
        TickOutcome::Locked { lines_cleared }
    }

    fn spawn_anchor(&self) -> Anchor {
        // Board dimensions are bounded by `GameConfig::validate`
        let row = i32::try_from(self.board.total_height() - 1).expect("validated row count");
        let col = i32::try_from((self.board.width() - 4) / 2).expect("validated width");
        Anchor::new(row, col)
    }

    /// Spawns the next piece, or ends the game if it does not fit.
    fn spawn_next(&mut self) -> bool {
        let piece = ActivePiece::new(self.piece_buffer.pop_next(), self.spawn_anchor());
        if self.board.fits(&piece) {
            self.active_piece = Some(piece);
            return true;
        }
        self.active_piece = None;
        self.session_state = SessionState::GameOver;
        info!(
            kind = ?piece.kind(),
            score = self.stats.score(),
            lines_cleared = self.stats.total_cleared_lines(),
            "game over: spawn blocked"
        );
        false
    }
}
