use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::RetryPolicy;
use crate::domain::{DocumentSession, ElementHandle, Locator, Scope, SessionError, SessionResult};

/// Bounded-retry front of a [`DocumentSession`]. Transient absence and
/// staleness are absorbed into `None`/`false` results; the caller decides
/// what a missing element means, nothing in here ends a run.
#[derive(Clone)]
pub struct ResilientAccessor {
    session: Arc<dyn DocumentSession>,
    policy: RetryPolicy,
}

impl ResilientAccessor {
    pub fn new(session: Arc<dyn DocumentSession>, policy: RetryPolicy) -> Self {
        Self { session, policy }
    }

    /// Finds one element, polling up to the configured attempt count.
    pub async fn find(&self, scope: Scope, locator: &Locator) -> Option<ElementHandle> {
        self.find_with(
            scope,
            locator,
            self.policy.find_timeout,
            self.policy.find_attempts,
        )
        .await
    }

    pub async fn find_with(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
        attempts: u32,
    ) -> Option<ElementHandle> {
        for attempt in 1..=attempts {
            match self.session.find(scope, locator, timeout).await {
                Ok(element) => {
                    debug!("Element found: {locator}");
                    return Some(element);
                }
                Err(SessionError::NotPresent | SessionError::Stale) => {
                    warn!("Element not found (attempt {attempt}/{attempts}): {locator}");
                }
                Err(err) => {
                    error!("Session error finding {locator}: {err}");
                }
            }
            if attempt < attempts {
                sleep(self.policy.retry_delay).await;
            }
        }

        error!(
            "Failed to find element after {} attempts: {locator}",
            attempts
        );
        None
    }

    /// Single-attempt lookup with its own short timeout, for elements that
    /// are usually absent.
    pub async fn probe(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
    ) -> Option<ElementHandle> {
        match self.session.find(scope, locator, timeout).await {
            Ok(element) => Some(element),
            Err(err) => {
                debug!("Probe for {locator} came up empty: {err}");
                None
            }
        }
    }

    /// An empty result is a normal answer, never a fault.
    pub async fn find_all(&self, scope: Scope, locator: &Locator) -> Vec<ElementHandle> {
        match self
            .session
            .find_all(scope, locator, self.policy.find_timeout)
            .await
        {
            Ok(elements) => {
                debug!("Found {} elements: {locator}", elements.len());
                elements
            }
            Err(err) => {
                warn!("No elements found ({err}): {locator}");
                Vec::new()
            }
        }
    }

    pub async fn attribute(&self, element: ElementHandle, name: &str) -> Option<String> {
        match self.session.attribute(element, name).await {
            Ok(value) => value,
            Err(err) => {
                warn!("Could not read attribute '{name}': {err}");
                None
            }
        }
    }

    /// Attribute read that surfaces the session error kind, for callers that
    /// re-resolve stale handles instead of absorbing them.
    pub async fn try_attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> SessionResult<Option<String>> {
        self.session.attribute(element, name).await
    }

    pub async fn text(&self, element: ElementHandle) -> Option<String> {
        match self.session.text(element).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("Could not read element text: {err}");
                None
            }
        }
    }

    /// Clicks with retries on momentary non-interactability. A stale handle
    /// fails immediately: the element identity changed, the caller must
    /// re-resolve it before clicking again.
    pub async fn click(&self, element: ElementHandle) -> bool {
        let attempts = self.policy.click_attempts;
        for attempt in 1..=attempts {
            match self.session.click(element).await {
                Ok(()) => {
                    debug!("Click succeeded");
                    return true;
                }
                Err(SessionError::NotInteractable) => {
                    warn!("Element not interactable (attempt {attempt}/{attempts})");
                    self.log_interactability(element).await;
                }
                Err(SessionError::Stale) => {
                    warn!("Stale element reference, click abandoned");
                    return false;
                }
                Err(err) => {
                    error!("Error clicking element: {err}");
                }
            }
            if attempt < attempts {
                sleep(self.policy.retry_delay).await;
            }
        }

        error!("Failed to click element after {attempts} attempts");
        false
    }

    /// Forced activation, one attempt. Only the submission fallback wants
    /// this; it bypasses the interactability checks a direct click performs.
    pub async fn force_click(&self, element: ElementHandle) -> bool {
        match self.session.force_click(element).await {
            Ok(()) => {
                debug!("Forced click succeeded");
                true
            }
            Err(err) => {
                error!("Forced click failed: {err}");
                false
            }
        }
    }

    /// One attempt only: repeating keystrokes into a half-written field
    /// would corrupt it, so faults are reported, never retried.
    pub async fn clear_and_type(&self, element: ElementHandle, value: &str) -> bool {
        match self.session.clear_and_type(element, value).await {
            Ok(()) => {
                debug!("Wrote '{value}' into field");
                true
            }
            Err(err) => {
                error!("Could not write '{value}' into field: {err}");
                false
            }
        }
    }

    pub async fn scroll_into_view(&self, element: ElementHandle) -> bool {
        match self.session.scroll_into_view(element).await {
            Ok(()) => true,
            Err(err) => {
                debug!("Could not scroll element into view: {err}");
                false
            }
        }
    }

    async fn log_interactability(&self, element: ElementHandle) {
        let displayed = self.session.is_displayed(element).await.ok();
        let enabled = self.session.is_enabled(element).await.ok();
        let tag = self.session.tag_name(element).await.ok();
        debug!("Element state - displayed: {displayed:?}, enabled: {enabled:?}, tag: {tag:?}");
    }
}
