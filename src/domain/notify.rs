use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::Result;

use super::game::{GameRecord, Tip};

/// Event emitted once per freshly tipped match.
#[derive(Debug, Clone, Serialize)]
pub struct TipNotification {
    pub kickoff: DateTime<Tz>,
    pub home_team: String,
    pub away_team: String,
    /// Home win, draw, away win.
    pub quotes: [f64; 3],
    pub tip: Tip,
}

impl TipNotification {
    pub fn for_game(game: &GameRecord, tip: Tip) -> Self {
        Self {
            kickoff: game.kickoff,
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),
            quotes: game.quotes,
            tip,
        }
    }
}

/// Outbound sink for tip events. Delivery is best effort: the caller logs a
/// failed or slow sink and moves on, it never retries and never lets the sink
/// influence the run.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_tipped(&self, notification: &TipNotification) -> Result<()>;
}
