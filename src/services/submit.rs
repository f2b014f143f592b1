use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::page;
use crate::domain::{Locator, Scope};
use crate::error::{Result, TipError};
use crate::services::accessor::ResilientAccessor;

/// Finalizes the batch of written predictions. Per-row faults are absorbed
/// elsewhere; a failure here discards everything the run wrote, so it is the
/// one per-run fault that must surface to the caller.
pub struct SubmissionGate {
    accessor: ResilientAccessor,
    settle_delay: Duration,
    scroll_pause: Duration,
}

impl SubmissionGate {
    pub fn new(accessor: ResilientAccessor, settle_delay: Duration, scroll_pause: Duration) -> Self {
        Self {
            accessor,
            settle_delay,
            scroll_pause,
        }
    }

    pub async fn submit_all(&self) -> Result<()> {
        info!("Submitting tips form");

        // Let late form updates settle before touching the control.
        sleep(self.settle_delay).await;

        let Some(button) = self
            .accessor
            .find(Scope::Root, &Locator::Name(page::SUBMIT_NAME))
            .await
        else {
            return Err(TipError::Submission("submit control not found".into()));
        };
        debug!("Found submit control, attempting to click");

        if self.accessor.scroll_into_view(button).await {
            sleep(self.scroll_pause).await;
            debug!("Scrolled submit control into view");
        }

        if self.accessor.click(button).await {
            info!("Tips form submitted");
            return Ok(());
        }

        info!("Direct click failed, trying forced activation");
        if self.accessor.force_click(button).await {
            info!("Tips form submitted via forced activation");
            return Ok(());
        }

        Err(TipError::Submission(
            "both direct and forced activation failed".into(),
        ))
    }
}
