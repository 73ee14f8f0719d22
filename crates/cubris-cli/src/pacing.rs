//! Gravity pacing for front ends.
//!
//! The engine has no notion of time; a front end decides how often to call
//! `tick`. This module holds the default schedule: a starting interval
//! picked from a [`Speed`] preset, shortened by 50 ms each time the player
//! clears enough lines, down to a floor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Starting gravity interval.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl Speed {
    #[must_use]
    pub const fn interval_ms(self) -> u64 {
        match self {
            Speed::Slow => 500,
            Speed::Medium => 250,
            Speed::Fast => 100,
        }
    }
}

/// Current gravity interval, updated from the running line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interval_ms: u64,
}

impl Pacer {
    const BASE_MS: u64 = 500;
    const STEP_MS: u64 = 50;
    /// No speed-up once the interval is at or below this.
    const FLOOR_MS: u64 = 75;
    const LINES_PER_STEP: u64 = 10;

    #[must_use]
    pub const fn new(speed: Speed) -> Self {
        Self {
            interval_ms: speed.interval_ms(),
        }
    }

    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Applies at most one speed-up for the given total line count.
    ///
    /// Returns true if the interval shrank.
    pub fn update(&mut self, total_lines: usize) -> bool {
        let lines = u64::try_from(total_lines).unwrap_or(u64::MAX);
        let steps_taken = Self::BASE_MS.saturating_sub(self.interval_ms) / Self::STEP_MS;
        if lines / Self::LINES_PER_STEP > steps_taken && self.interval_ms > Self::FLOOR_MS {
            self.interval_ms -= Self::STEP_MS;
            return true;
        }
        false
    }
}
