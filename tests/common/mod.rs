//! Shared test harness: page builders, a fault-injecting session wrapper and
//! a recording notification sink.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Europe::Berlin;
use clap::Parser;

use autotipp::config::{Args, Config, RetryPolicy};
use autotipp::domain::page;
use autotipp::domain::{
    DocumentSession, ElementHandle, Locator, NotificationSink, Scope, SessionError, SessionResult,
    TipNotification,
};
use autotipp::error::TipError;
use autotipp::infrastructure::SnapshotSession;

/// Defaults with all waits removed, so runs against in-memory pages finish
/// instantly.
pub fn test_config() -> Config {
    let args = Args::parse_from(["autotipp"]);
    let mut config = Config::from_args(args).expect("default args should configure");
    config.retry = RetryPolicy::immediate();
    config.consent_probe_timeout = Duration::ZERO;
    config.submit_settle_delay = Duration::ZERO;
    config.scroll_pause = Duration::ZERO;
    config
}

pub fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

/// A kickoff timestamp `minutes` from now, rendered the way the page does.
/// Minute precision keeps comparisons against the real clock safe as long as
/// tests stay well away from the window boundaries.
pub fn kickoff_in(minutes: i64) -> String {
    let time = Utc::now().with_timezone(&Berlin) + chrono::Duration::minutes(minutes);
    time.format(page::KICKOFF_FORMAT).to_string()
}

// ---- page markup builders -------------------------------------------------

pub fn tipping_page(rows: &[String]) -> String {
    format!(
        concat!(
            "<html><body>\n",
            "<form id=\"tippabgabeForm\" method=\"post\">\n",
            "<table id=\"tippabgabeSpiele\" class=\"tippabgabe\"><tbody>\n",
            "{}\n",
            "</tbody></table>\n",
            "<input type=\"submit\" name=\"submitbutton\" value=\"Tipps speichern\"/>\n",
            "</form>\n",
            "</body></html>"
        ),
        rows.join("\n")
    )
}

/// Same page with a consent overlay sitting in front of the form.
pub fn tipping_page_with_consent(rows: &[String]) -> String {
    tipping_page(rows).replace(
        "<form",
        "<div class=\"message-overlay\"><button class=\"message-accept\">Zustimmen</button></div>\n<form",
    )
}

pub fn header_row(time: &str) -> String {
    format!(r#"<tr class="rowheader"><td colspan="5">Spieltag - {time}</td></tr>"#)
}

pub fn visible_time(time: &str) -> String {
    format!(r#"<td class="kicktipp-time nw">{time}</td>"#)
}

pub fn hidden_time() -> String {
    r#"<td class="kicktipp-time nw hide"></td>"#.to_string()
}

pub fn quote_blob(quotes: &str) -> String {
    format!(r##"<td class="wettquote"><a class="quote-link" href="#">Quote: {quotes}</a></td>"##)
}

pub fn quote_entries(one: &str, x: &str, two: &str) -> String {
    format!(
        concat!(
            r#"<td class="wettquote">"#,
            r#"<span class="quote-entry" data-outcome="X">{x}</span>"#,
            r#"<span class="quote-entry" data-outcome="2">{two}</span>"#,
            r#"<span class="quote-entry" data-outcome="1">{one}</span>"#,
            "</td>"
        ),
        one = one,
        x = x,
        two = two,
    )
}

/// A data row whose prediction inputs are present. Empty values make the row
/// open; two non-empty values make it already tipped.
pub fn editable_row(
    game: u32,
    time_cell: &str,
    home: &str,
    away: &str,
    home_value: &str,
    away_value: &str,
    quotes_cell: &str,
) -> String {
    format!(
        concat!(
            r#"<tr class="datarow">"#,
            "{time_cell}",
            "<td>{home}</td>",
            "<td>{away}</td>",
            r#"<td class="tippabgabe-tipp">"#,
            r#"<input type="text" name="spieltippForms[{game}].heimTipp" value="{home_value}"/>"#,
            r#"<input type="text" name="spieltippForms[{game}].gastTipp" value="{away_value}"/>"#,
            "</td>",
            "{quotes_cell}",
            "</tr>"
        ),
        time_cell = time_cell,
        home = home,
        away = away,
        game = game,
        home_value = home_value,
        away_value = away_value,
        quotes_cell = quotes_cell,
    )
}

/// A data row whose inputs are gone; only the posted result remains.
pub fn finished_row(time_cell: &str, home: &str, away: &str, result: &str) -> String {
    format!(
        concat!(
            r#"<tr class="datarow">"#,
            "{time_cell}",
            "<td>{home}</td>",
            "<td>{away}</td>",
            r#"<td class="ergebnis">{result}</td>"#,
            "</tr>"
        ),
        time_cell = time_cell,
        home = home,
        away = away,
        result = result,
    )
}

// ---- fault-injecting session ----------------------------------------------

/// [`SnapshotSession`] wrapper that can refuse specific operations, for
/// exercising the engine's fault paths against otherwise valid markup.
pub struct FakeSession {
    inner: SnapshotSession,
    stale_row_reads: Mutex<u32>,
    broken_fields: Mutex<Vec<&'static str>>,
    submit_click_broken: AtomicBool,
    force_click_broken: AtomicBool,
    clicked_classes: Mutex<Vec<String>>,
}

impl FakeSession {
    pub fn new(html: &str) -> Self {
        Self {
            inner: SnapshotSession::from_html(html),
            stale_row_reads: Mutex::new(0),
            broken_fields: Mutex::new(Vec::new()),
            submit_click_broken: AtomicBool::new(false),
            force_click_broken: AtomicBool::new(false),
            clicked_classes: Mutex::new(Vec::new()),
        }
    }

    /// The next `count` class reads on table rows report a stale handle.
    pub fn stale_next_row_reads(&self, count: u32) {
        *self.stale_row_reads.lock().unwrap() = count;
    }

    /// Typing into any input whose name contains `fragment` fails.
    pub fn break_field(&self, fragment: &'static str) {
        self.broken_fields.lock().unwrap().push(fragment);
    }

    pub fn break_submit_click(&self) {
        self.submit_click_broken.store(true, Ordering::SeqCst);
    }

    pub fn break_force_click(&self) {
        self.force_click_broken.store(true, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> bool {
        self.inner.submitted()
    }

    pub fn field_value(&self, fragment: &'static str) -> Option<String> {
        self.inner.field_value(fragment)
    }

    pub fn clicked_consent(&self) -> bool {
        self.clicked_classes
            .lock()
            .unwrap()
            .iter()
            .any(|class| class.contains(page::CONSENT_ACCEPT_CLASS))
    }

    async fn is_submit(&self, element: ElementHandle) -> SessionResult<bool> {
        Ok(self
            .inner
            .attribute(element, "name")
            .await?
            .is_some_and(|name| name == page::SUBMIT_NAME))
    }
}

#[async_trait]
impl DocumentSession for FakeSession {
    async fn find(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
    ) -> SessionResult<ElementHandle> {
        self.inner.find(scope, locator, timeout).await
    }

    async fn find_all(
        &self,
        scope: Scope,
        locator: &Locator,
        timeout: Duration,
    ) -> SessionResult<Vec<ElementHandle>> {
        self.inner.find_all(scope, locator, timeout).await
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> SessionResult<Option<String>> {
        if name == "class" && self.inner.tag_name(element).await? == "tr" {
            let mut pending = self.stale_row_reads.lock().unwrap();
            if *pending > 0 {
                *pending -= 1;
                return Err(SessionError::Stale);
            }
        }
        self.inner.attribute(element, name).await
    }

    async fn text(&self, element: ElementHandle) -> SessionResult<String> {
        self.inner.text(element).await
    }

    async fn click(&self, element: ElementHandle) -> SessionResult<()> {
        if let Some(class) = self.inner.attribute(element, "class").await? {
            self.clicked_classes.lock().unwrap().push(class);
        }
        if self.is_submit(element).await? && self.submit_click_broken.load(Ordering::SeqCst) {
            return Err(SessionError::NotInteractable);
        }
        self.inner.click(element).await
    }

    async fn force_click(&self, element: ElementHandle) -> SessionResult<()> {
        if self.is_submit(element).await? && self.force_click_broken.load(Ordering::SeqCst) {
            return Err(SessionError::NotInteractable);
        }
        self.inner.force_click(element).await
    }

    async fn clear_and_type(&self, element: ElementHandle, value: &str) -> SessionResult<()> {
        if let Some(name) = self.inner.attribute(element, "name").await? {
            let broken = self
                .broken_fields
                .lock()
                .unwrap()
                .iter()
                .any(|fragment| name.contains(fragment));
            if broken {
                return Err(SessionError::Backend("field wired to fail".into()));
            }
        }
        self.inner.clear_and_type(element, value).await
    }

    async fn scroll_into_view(&self, element: ElementHandle) -> SessionResult<()> {
        self.inner.scroll_into_view(element).await
    }

    async fn is_displayed(&self, element: ElementHandle) -> SessionResult<bool> {
        self.inner.is_displayed(element).await
    }

    async fn is_enabled(&self, element: ElementHandle) -> SessionResult<bool> {
        self.inner.is_enabled(element).await
    }

    async fn tag_name(&self, element: ElementHandle) -> SessionResult<String> {
        self.inner.tag_name(element).await
    }
}

// ---- recording sink -------------------------------------------------------

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TipNotification>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the event, then reports delivery as failed.
    pub fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    pub fn events(&self) -> Vec<TipNotification> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify_tipped(&self, notification: &TipNotification) -> autotipp::Result<()> {
        self.events.lock().unwrap().push(notification.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(TipError::Notification("sink wired to fail".into()));
        }
        Ok(())
    }
}
