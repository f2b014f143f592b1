use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::page;
use crate::domain::{NotificationSink, TipNotification};
use crate::error::Result;

/// Sink that renders tip events into the run log. Stands in for whatever push
/// transport a deployment wires up; the payload is the same JSON document a
/// webhook would receive.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify_tipped(&self, notification: &TipNotification) -> Result<()> {
        let payload = serde_json::to_string(notification)?;
        info!(
            "{} - {} tipped {} (kickoff {}, quotes {:?})",
            notification.home_team,
            notification.away_team,
            notification.tip,
            notification.kickoff.format(page::KICKOFF_FORMAT),
            notification.quotes,
        );
        debug!("Notification payload: {payload}");
        Ok(())
    }
}
