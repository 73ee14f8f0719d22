use chrono::{DateTime, Utc};
use cubris_engine::{Game, GameStats, PieceSeed};
use serde::Serialize;

use crate::pacing::Speed;

/// Final state of a simulated or replayed game.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    /// When the run started (ISO 8601)
    pub started_at: DateTime<Utc>,
    pub seed: PieceSeed,
    /// Gravity steps applied
    pub ticks: usize,
    pub game_over: bool,
    pub level: usize,
    pub stats: GameStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacing: Option<PacingSummary>,
}

impl SessionSummary {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, seed: PieceSeed, ticks: usize, game: &Game) -> Self {
        Self {
            started_at,
            seed,
            ticks,
            game_over: game.is_game_over(),
            level: game.level(),
            stats: game.stats().clone(),
            pacing: None,
        }
    }
}

/// Clock state at the end of a simulation.
#[derive(Debug, Clone, Serialize)]
pub struct PacingSummary {
    pub speed: Speed,
    pub final_interval_ms: u64,
    pub simulated_ms: u64,
}
