use serde::{Deserialize, Serialize};

/// Points awarded per lock, indexed by the number of lines it cleared.
///
/// The default rewards multi-line clears super-linearly:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
///
/// A usable table is strictly increasing; [`GameConfig::validate`](super::GameConfig::validate)
/// rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable([usize; 5]);

impl Default for ScoreTable {
    fn default() -> Self {
        Self([0, 100, 300, 500, 800])
    }
}

impl ScoreTable {
    #[must_use]
    pub const fn new(points: [usize; 5]) -> Self {
        Self(points)
    }

    #[must_use]
    pub const fn points(&self) -> [usize; 5] {
        self.0
    }

    /// Points for clearing `lines` at once. A single piece spans at most
    /// four rows, so larger counts are scored as four.
    #[must_use]
    pub fn points_for(&self, lines: usize) -> usize {
        self.0[lines.min(4)]
    }

    #[must_use]
    pub fn is_strictly_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] < w[1])
    }
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// - **Score**: Points earned from line clears
/// - **Level**: Derived from total lines cleared (1 level per 10 lines)
/// - **Completed pieces**: Total number of pieces locked
/// - **Line clear distribution**: Count of locks by lines cleared
///
/// # Example
///
/// ```
/// use cubris_engine::{GameStats, ScoreTable};
///
/// let mut stats = GameStats::new(ScoreTable::default());
/// stats.complete_piece_drop(4);
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    #[serde(skip)]
    score_table: ScoreTable,
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new(ScoreTable::default())
    }
}

impl GameStats {
    pub const LINES_PER_LEVEL: usize = 10;

    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new(score_table: ScoreTable) -> Self {
        Self {
            score_table,
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Level increases by 1 for every 10 lines cleared.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / Self::LINES_PER_LEVEL
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Histogram of locks by lines cleared; index 0 counts locks that
    /// cleared nothing.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records one locked piece that cleared `cleared_lines` lines.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines.min(4)] += 1;
        self.score = self.score.saturating_add(self.score_table.points_for(cleared_lines));
    }
}
