//! Game rules on top of the core data structures.
//!
//! - [`Game`] - The engine: active piece, gravity, locking, line clears, game over
//! - [`GameConfig`] - Board size, rotation system, score table and seed
//! - [`GameStats`] - Score, cleared lines, level and piece count
//! - [`PieceBuffer`] - 7-bag piece generation system
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Build a [`Game`] from a validated [`GameConfig`]; the first piece spawns
//!    in the hidden rows above the playfield
//! 2. The front end forwards moves and rotations, and calls [`Game::tick`] at
//!    its own pace
//! 3. A piece that cannot fall further locks, full rows clear and the next
//!    piece spawns
//! 4. Play ends when a new piece collides at spawn; [`Game::reset`] starts over

pub use self::{config::*, game::*, game_stats::*, piece_buffer::*};

mod config;
mod game;
mod game_stats;
mod piece_buffer;
