use std::fmt;

use serde::Serialize;

use super::game::Tip;

/// Why a data row was passed over. Skips are expected states, not faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The editable fields are gone; the match is over or tipping is closed.
    /// Carries the posted result when the page still shows one.
    Finished(Option<String>),
    /// Both prediction fields already hold values from an earlier run.
    AlreadyTipped { home: String, away: String },
    /// Kickoff is in the past.
    AlreadyStarted,
    /// Kickoff lies beyond the configured tipping window.
    TooEarly,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Finished(Some(result)) => write!(f, "finished, result {result}"),
            SkipReason::Finished(None) => write!(f, "finished or closed"),
            SkipReason::AlreadyTipped { home, away } => {
                write!(f, "already tipped {home}:{away}")
            }
            SkipReason::AlreadyStarted => write!(f, "already started"),
            SkipReason::TooEarly => write!(f, "too early to tip"),
        }
    }
}

/// A fault confined to one row. Never escalates past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFailure {
    /// The row could not be read even after re-resolving the table.
    Inaccessible,
    /// A team cell was missing or empty.
    MissingTeams,
    /// The quotes could not be extracted or did not validate.
    MalformedQuotes(String),
    /// Writing a prediction field failed mid-row.
    WriteFailed,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFailure::Inaccessible => write!(f, "row inaccessible"),
            RowFailure::MissingTeams => write!(f, "team names missing"),
            RowFailure::MalformedQuotes(detail) => write!(f, "malformed quotes: {detail}"),
            RowFailure::WriteFailed => write!(f, "could not write prediction fields"),
        }
    }
}

/// Terminal classification of one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Tipped(Tip),
    Skipped(SkipReason),
    Failed(RowFailure),
}

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub processed: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl RunReport {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Tipped(_) => self.processed += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
            RowOutcome::Failed(_) => self.errors += 1,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tipped, {} skipped, {} errors",
            self.processed, self.skipped, self.errors
        )
    }
}
