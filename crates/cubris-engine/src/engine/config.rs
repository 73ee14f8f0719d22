use serde::{Deserialize, Serialize};

use crate::{ConfigError, PieceSeed, RotationSystem};

use super::game_stats::ScoreTable;

/// Construction parameters of a [`Game`](super::Game).
///
/// Every field has a default, so a configuration file only needs the fields
/// it changes:
///
/// ```
/// use cubris_engine::{GameConfig, RotationSystem};
///
/// let config: GameConfig =
///     serde_json::from_str(r#"{ "width": 8, "rotation_system": "simple_kick" }"#).unwrap();
/// assert_eq!(config.width, 8);
/// assert_eq!(config.height, GameConfig::DEFAULT_HEIGHT);
/// assert_eq!(config.rotation_system, RotationSystem::SimpleKick);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of visible rows.
    pub height: usize,
    /// Hidden rows above the visible field where pieces spawn.
    ///
    /// A piece spawns with its bounding box flush with the top of this
    /// buffer; a spawn that overlaps settled blocks ends the game.
    pub spawn_rows: usize,
    pub rotation_system: RotationSystem,
    pub score_table: ScoreTable,
    /// Fixed piece sequence seed; random when absent.
    pub seed: Option<PieceSeed>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            spawn_rows: Self::DEFAULT_SPAWN_ROWS,
            rotation_system: RotationSystem::default(),
            score_table: ScoreTable::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub const DEFAULT_WIDTH: usize = 10;
    pub const DEFAULT_HEIGHT: usize = 20;
    pub const DEFAULT_SPAWN_ROWS: usize = 4;
    /// Every piece fits horizontally in 4 columns.
    pub const MIN_WIDTH: usize = 4;
    /// Every spawn-orientation piece fits in the top 2 rows of its box.
    pub const MIN_SPAWN_ROWS: usize = 2;
    pub const MAX_WIDTH: usize = 256;
    /// Upper bound on `height + spawn_rows`.
    pub const MAX_ROWS: usize = 1024;

    #[must_use]
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: PieceSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < Self::MIN_WIDTH {
            return Err(ConfigError::BoardTooNarrow {
                width: self.width,
                min: Self::MIN_WIDTH,
            });
        }
        if self.width > Self::MAX_WIDTH {
            return Err(ConfigError::BoardTooWide {
                width: self.width,
                max: Self::MAX_WIDTH,
            });
        }
        if self.height == 0 {
            return Err(ConfigError::BoardTooShort);
        }
        if self.spawn_rows < Self::MIN_SPAWN_ROWS {
            return Err(ConfigError::SpawnBufferTooShallow {
                spawn_rows: self.spawn_rows,
                min: Self::MIN_SPAWN_ROWS,
            });
        }
        let rows = self.height.saturating_add(self.spawn_rows);
        if rows > Self::MAX_ROWS {
            return Err(ConfigError::BoardTooTall {
                rows,
                max: Self::MAX_ROWS,
            });
        }
        if !self.score_table.is_strictly_increasing() {
            return Err(ConfigError::ScoreTableNotIncreasing {
                table: self.score_table.points(),
            });
        }
        Ok(())
    }
}
