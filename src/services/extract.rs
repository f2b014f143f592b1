use tracing::debug;

use crate::domain::page;
use crate::domain::{ElementHandle, Locator, RowFailure, Scope};
use crate::services::accessor::ResilientAccessor;

/// The two editable inputs of one data row.
#[derive(Debug, Clone, Copy)]
pub struct PredictionFields {
    pub home: ElementHandle,
    pub away: ElementHandle,
}

/// Where a data row stands with respect to its prediction inputs.
#[derive(Debug, Clone)]
pub enum FieldsState {
    /// At least one field is empty; the row may be written. A half-filled
    /// pair lands here too: it cannot be trusted as an intentional tip.
    Open(PredictionFields),
    /// Both fields already hold values from an earlier run.
    AlreadyTipped {
        fields: PredictionFields,
        home: String,
        away: String,
    },
    /// The inputs are gone: the match is over or tipping is closed. Carries
    /// the posted result when the page still shows one.
    Closed(Option<String>),
}

/// Pulls team names, quotes and prediction fields out of one data row.
pub struct GameRecordExtractor {
    accessor: ResilientAccessor,
}

impl GameRecordExtractor {
    pub fn new(accessor: ResilientAccessor) -> Self {
        Self { accessor }
    }

    /// Both team names, trimmed. `None` when either cell is missing or empty,
    /// which aborts this row only.
    pub async fn team_names(&self, row: ElementHandle) -> Option<(String, String)> {
        let home = self.cell_text(row, page::HOME_TEAM_CELL).await?;
        let away = self.cell_text(row, page::AWAY_TEAM_CELL).await?;
        Some((home, away))
    }

    pub async fn prediction_fields(&self, row: ElementHandle) -> FieldsState {
        let home = self
            .accessor
            .find(
                Scope::Within(row),
                &Locator::NameContains(page::HOME_TIP_NAME),
            )
            .await;
        let away = self
            .accessor
            .find(
                Scope::Within(row),
                &Locator::NameContains(page::AWAY_TIP_NAME),
            )
            .await;

        let (Some(home), Some(away)) = (home, away) else {
            let result = self.cell_text(row, page::RESULT_CELL).await;
            if let Some(result) = &result {
                debug!("Game is over or not available: {result}");
            }
            return FieldsState::Closed(result);
        };

        let fields = PredictionFields { home, away };
        let home_value = self
            .accessor
            .attribute(fields.home, "value")
            .await
            .unwrap_or_default();
        let away_value = self
            .accessor
            .attribute(fields.away, "value")
            .await
            .unwrap_or_default();

        if !home_value.is_empty() && !away_value.is_empty() {
            FieldsState::AlreadyTipped {
                fields,
                home: home_value,
                away: away_value,
            }
        } else {
            FieldsState::Open(fields)
        }
    }

    /// The three quotes in home/draw/away order, from either accepted markup
    /// shape: the legacy single text blob, or one labelled element per
    /// outcome.
    pub async fn quotes(&self, row: ElementHandle) -> Result<[f64; 3], RowFailure> {
        if let Some(link) = self
            .accessor
            .find(
                Scope::Within(row),
                &Locator::ClassContains(page::QUOTE_LINK_CLASS),
            )
            .await
        {
            let Some(raw) = self.accessor.text(link).await else {
                return Err(RowFailure::MalformedQuotes("quote text unreadable".into()));
            };
            return parse_quote_blob(&raw);
        }

        let entries = self
            .accessor
            .find_all(
                Scope::Within(row),
                &Locator::ClassContains(page::QUOTE_ENTRY_CLASS),
            )
            .await;
        if entries.is_empty() {
            return Err(RowFailure::MalformedQuotes("no quote markup in row".into()));
        }

        let mut labelled = Vec::with_capacity(entries.len());
        for entry in entries {
            let outcome = self.accessor.attribute(entry, page::QUOTE_OUTCOME_ATTR).await;
            let text = self.accessor.text(entry).await;
            if let (Some(outcome), Some(text)) = (outcome, text) {
                labelled.push((outcome, text));
            }
        }
        assemble_structured(labelled)
    }

    async fn cell_text(&self, row: ElementHandle, cell: usize) -> Option<String> {
        let handle = self
            .accessor
            .find(Scope::Within(row), &Locator::Cell(cell))
            .await?;
        let text = self.accessor.text(handle).await?;
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parses the legacy blob, `Quote: a / b / c` or `a | b | c`. Exactly three
/// tokens or the row is malformed.
pub(crate) fn parse_quote_blob(raw: &str) -> Result<[f64; 3], RowFailure> {
    let text = raw.trim().trim_start_matches(page::QUOTE_PREFIX).trim();

    let tokens: Vec<&str> = if text.contains(" / ") {
        text.split(" / ").collect()
    } else if text.contains(" | ") {
        text.split(" | ").collect()
    } else {
        return Err(RowFailure::MalformedQuotes(format!(
            "unrecognized quote format: '{text}'"
        )));
    };

    if tokens.len() != 3 {
        return Err(RowFailure::MalformedQuotes(format!(
            "expected 3 quotes, got {}",
            tokens.len()
        )));
    }

    let mut quotes = [0.0; 3];
    for (slot, token) in quotes.iter_mut().zip(&tokens) {
        *slot = parse_price(token)?;
    }
    Ok(quotes)
}

/// Reassembles labelled quote entries into `1, X, 2` order regardless of the
/// order the document presented them in.
pub(crate) fn assemble_structured(entries: Vec<(String, String)>) -> Result<[f64; 3], RowFailure> {
    if entries.len() != 3 {
        return Err(RowFailure::MalformedQuotes(format!(
            "expected 3 quote entries, got {}",
            entries.len()
        )));
    }

    let mut quotes = [None; 3];
    for (outcome, text) in &entries {
        let slot = match outcome.trim() {
            "1" => 0,
            "X" => 1,
            "2" => 2,
            other => {
                return Err(RowFailure::MalformedQuotes(format!(
                    "unknown outcome label '{other}'"
                )))
            }
        };
        quotes[slot] = Some(parse_price(text)?);
    }

    match quotes {
        [Some(one), Some(x), Some(two)] => Ok([one, x, two]),
        _ => Err(RowFailure::MalformedQuotes(
            "duplicate outcome labels".into(),
        )),
    }
}

fn parse_price(token: &str) -> Result<f64, RowFailure> {
    let token = token.trim();
    let value: f64 = token
        .parse()
        .map_err(|_| RowFailure::MalformedQuotes(format!("'{token}' is not a number")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(RowFailure::MalformedQuotes(format!(
            "price {value} out of range"
        )));
    }
    Ok(value)
}
