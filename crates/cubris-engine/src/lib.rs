//! Falling-block puzzle engine.
//!
//! The engine is a pure, synchronous state machine: a [`Board`] of settled
//! blocks, an [`ActivePiece`] falling through it, and a [`Game`] that applies
//! gravity, player commands, locking, line clears, scoring and game-over
//! detection. It performs no I/O and knows nothing about wall-clock time, so
//! any front end can drive it by calling [`Game::tick`] on its own schedule.
//!
//! # Example
//!
//! ```
//! use cubris_engine::{Game, GameConfig, TickOutcome};
//!
//! let mut game = Game::new(GameConfig::default()).unwrap();
//! game.move_left();
//! game.rotate_cw();
//!
//! match game.tick() {
//!     TickOutcome::Fell => {}
//!     TickOutcome::Locked { lines_cleared } => println!("cleared {lines_cleared}"),
//!     TickOutcome::GameOver => println!("game over"),
//! }
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Why a player command had no effect.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    derive_more::Display,
    derive_more::Error,
    derive_more::IsVariant,
)]
pub enum CommandError {
    #[display("active piece is blocked")]
    Blocked,
    #[display("game is over")]
    GameOver,
}

/// Rejected [`GameConfig`] values.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board width {width} is below the minimum of {min}")]
    BoardTooNarrow { width: usize, min: usize },
    #[display("board height must be at least 1")]
    BoardTooShort,
    #[display("board width {width} exceeds the maximum of {max}")]
    BoardTooWide { width: usize, max: usize },
    #[display("board of {rows} rows including the spawn buffer exceeds the maximum of {max}")]
    BoardTooTall { rows: usize, max: usize },
    #[display("spawn buffer of {spawn_rows} rows is below the minimum of {min}")]
    SpawnBufferTooShallow { spawn_rows: usize, min: usize },
    #[display("score table must be strictly increasing, got {table:?}")]
    ScoreTableNotIncreasing { table: [usize; 5] },
}
