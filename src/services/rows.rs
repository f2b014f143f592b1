//! Row classification and the kickoff time state carried across rows.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::page;
use crate::domain::{ElementHandle, Locator, Scope};
use crate::services::accessor::ResilientAccessor;

static KICKOFF_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{2} \d{2}:\d{2}").unwrap());

/// What a table row is, decided once per row from its `class` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Announces a kickoff time shared by the data rows that follow.
    Header,
    /// Exactly one match.
    Data,
    /// Anything else; ignored by the scan.
    Other,
}

pub fn classify(class_attr: Option<&str>) -> RowKind {
    match class_attr {
        Some(class) if class.contains(page::HEADER_ROW_CLASS) => RowKind::Header,
        Some(class) if class.contains(page::DATA_ROW_CLASS) => RowKind::Data,
        _ => RowKind::Other,
    }
}

/// Cheap pre-filter for cell text worth handing to the parser.
pub(crate) fn looks_like_time(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit()) && (text.contains('.') || text.contains(':'))
}

/// Pulls a `dd.mm.yy hh:mm` token out of `text` and resolves it in `tz`.
/// Surrounding label text is tolerated; a missing or malformed token is `None`.
pub(crate) fn parse_kickoff(text: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let token = KICKOFF_TOKEN.find(text)?.as_str();
    let naive = NaiveDateTime::parse_from_str(token, page::KICKOFF_FORMAT).ok()?;
    tz.from_local_datetime(&naive).earliest()
}

pub(crate) fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Carries the most recently seen kickoff time forward across rows. One
/// tracker lives for exactly one pipeline run; nothing else mutates it.
pub struct TimeTracker {
    tz: Tz,
    last_seen: Option<DateTime<Tz>>,
}

impl TimeTracker {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            last_seen: None,
        }
    }

    pub fn carried(&self) -> Option<DateTime<Tz>> {
        self.last_seen
    }

    pub fn observe(&mut self, time: DateTime<Tz>, source: &str) {
        self.last_seen = Some(time);
        debug!(
            "Updated kickoff time from {source}: {}",
            time.format(page::KICKOFF_FORMAT)
        );
    }

    /// Scans a header row's cells for a time-shaped value and takes the first
    /// one that parses. A header that yields nothing leaves the state alone.
    pub async fn observe_header_row(&mut self, accessor: &ResilientAccessor, row: ElementHandle) {
        let cells = accessor.find_all(Scope::Within(row), &Locator::Cells).await;
        for cell in cells {
            let Some(text) = accessor.text(cell).await else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() || !looks_like_time(text) {
                continue;
            }
            match parse_kickoff(text, self.tz) {
                Some(time) => {
                    debug!("Found time in rowheader cell: '{text}'");
                    self.observe(time, "rowheader");
                    return;
                }
                None => debug!("Cell text '{text}' looked like a time but did not parse"),
            }
        }
        debug!("Could not extract time from rowheader");
    }

    /// Resolves the effective kickoff time of a data row. A visible own time
    /// cell wins and refreshes the carried state; a hidden cell merely echoes
    /// the preceding header and must not reset it. With no time anywhere the
    /// row is stamped with the current moment so it can still be evaluated.
    pub async fn resolve_kickoff(
        &mut self,
        accessor: &ResilientAccessor,
        row: ElementHandle,
    ) -> DateTime<Tz> {
        if let Some(cell) = accessor
            .find(Scope::Within(row), &Locator::Cell(page::TIME_CELL))
            .await
        {
            let class = accessor.attribute(cell, "class").await.unwrap_or_default();
            debug!("Time cell class: '{class}'");

            if class.contains(page::HIDDEN_CLASS) {
                debug!("Time cell is hidden, using carried time");
            } else if let Some(text) = accessor.text(cell).await {
                let text = text.trim();
                if !text.is_empty() {
                    match parse_kickoff(text, self.tz) {
                        Some(time) => {
                            debug!("Found visible time in datarow: '{text}'");
                            self.observe(time, "datarow");
                            return time;
                        }
                        None => debug!("Could not parse datarow time '{text}'"),
                    }
                }
            }
        }

        match self.last_seen {
            Some(time) => {
                debug!(
                    "Using carried kickoff time: {}",
                    time.format(page::KICKOFF_FORMAT)
                );
                time
            }
            None => {
                warn!("No kickoff time available, stamping the current moment");
                now_in(self.tz)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn classify_by_class_fragment() {
        assert_eq!(classify(Some("rowheader big")), RowKind::Header);
        assert_eq!(classify(Some("datarow odd")), RowKind::Data);
        assert_eq!(classify(Some("spacer")), RowKind::Other);
        assert_eq!(classify(None), RowKind::Other);
    }

    #[test]
    fn time_shaped_text_needs_a_digit_and_a_separator() {
        assert!(looks_like_time("01.03.25 15:30"));
        assert!(looks_like_time("15:30"));
        assert!(!looks_like_time("Bundesliga"));
        assert!(!looks_like_time("..."));
        assert!(!looks_like_time("123"));
    }

    #[test]
    fn kickoff_parses_in_the_reference_zone() {
        let time = parse_kickoff("01.03.25 15:30", Berlin).unwrap();
        assert_eq!(time.format("%d.%m.%y %H:%M").to_string(), "01.03.25 15:30");
        assert_eq!(time.timezone(), Berlin);
    }

    #[test]
    fn kickoff_token_is_found_inside_label_text() {
        let time = parse_kickoff("Spieltag 24 - 01.03.25 15:30 Uhr", Berlin).unwrap();
        assert_eq!(time.format("%d.%m.%y %H:%M").to_string(), "01.03.25 15:30");
    }

    #[test]
    fn garbage_is_not_a_kickoff() {
        assert!(parse_kickoff("späteres Datum", Berlin).is_none());
        assert!(parse_kickoff("01.03.25", Berlin).is_none());
        assert!(parse_kickoff("99.99.99 99:99", Berlin).is_none());
    }

    #[test]
    fn tracker_starts_empty_and_keeps_the_last_observation() {
        let mut tracker = TimeTracker::new(Berlin);
        assert!(tracker.carried().is_none());

        let first = parse_kickoff("01.03.25 15:30", Berlin).unwrap();
        let second = parse_kickoff("01.03.25 18:30", Berlin).unwrap();
        tracker.observe(first, "rowheader");
        assert_eq!(tracker.carried(), Some(first));
        tracker.observe(second, "datarow");
        assert_eq!(tracker.carried(), Some(second));
    }
}
