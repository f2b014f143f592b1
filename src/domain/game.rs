use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use super::page;

/// One match resolved from a data row.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub home_team: String,
    pub away_team: String,
    pub kickoff: DateTime<Tz>,
    /// Betting quotes in fixed order: home win, draw, away win. The draw quote
    /// is carried for downstream consumers; the tip formula never reads it.
    pub quotes: [f64; 3],
}

impl GameRecord {
    pub fn home_quote(&self) -> f64 {
        self.quotes[0]
    }

    pub fn draw_quote(&self) -> f64 {
        self.quotes[1]
    }

    pub fn away_quote(&self) -> f64 {
        self.quotes[2]
    }
}

impl fmt::Display for GameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {} at {}",
            self.home_team,
            self.away_team,
            self.kickoff.format(page::KICKOFF_FORMAT)
        )
    }
}

/// A predicted final score, home goals first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tip {
    pub home: u32,
    pub away: u32,
}

impl fmt::Display for Tip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}
