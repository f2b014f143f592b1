use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::domain::page;
use crate::domain::{
    DocumentSession, ElementHandle, GameRecord, Locator, NotificationSink, RowFailure, RowOutcome,
    RunReport, Scope, SessionError, SkipReason, Tip, TipNotification,
};
use crate::error::{Result, TipError};
use crate::services::accessor::ResilientAccessor;
use crate::services::extract::{FieldsState, GameRecordExtractor, PredictionFields};
use crate::services::rows::{self, RowKind, TimeTracker};
use crate::services::submit::SubmissionGate;
use crate::services::tip::{calculate_tip, RandomBit, ThreadRngBit};

/// Walks the game table row by row, carrying kickoff state forward, tipping
/// every open game inside the configured window, and submitting the batch at
/// the end. One instance drives one document session; runs are strictly
/// sequential and per-run state never leaks between them.
pub struct TipPipeline {
    accessor: ResilientAccessor,
    extractor: GameRecordExtractor,
    gate: SubmissionGate,
    sink: Arc<dyn NotificationSink>,
    random: Box<dyn RandomBit>,
    config: Config,
}

impl TipPipeline {
    pub fn new(
        session: Arc<dyn DocumentSession>,
        sink: Arc<dyn NotificationSink>,
        config: Config,
    ) -> Self {
        let accessor = ResilientAccessor::new(session, config.retry.clone());
        let extractor = GameRecordExtractor::new(accessor.clone());
        let gate = SubmissionGate::new(
            accessor.clone(),
            config.submit_settle_delay,
            config.scroll_pause,
        );
        Self {
            accessor,
            extractor,
            gate,
            sink,
            random: Box::new(ThreadRngBit),
            config,
        }
    }

    /// Swaps the random goal source, making runs reproducible.
    pub fn with_random_bit(mut self, random: Box<dyn RandomBit>) -> Self {
        self.random = random;
        self
    }

    /// Entry point. Only two faults are fatal: the game table being missing
    /// and submission failing. Everything that goes wrong inside a single
    /// row is absorbed into the report and the scan moves on.
    pub async fn tip_all_games(&mut self) -> Result<RunReport> {
        info!("Starting tipping run");

        self.dismiss_consent_overlay().await;

        let table = self
            .accessor
            .find(Scope::Root, &Locator::Id(page::GAME_TABLE_ID))
            .await
            .ok_or(TipError::TableNotFound)?;

        let games = self
            .accessor
            .find_all(
                Scope::Within(table),
                &Locator::ClassContains(page::DATA_ROW_CLASS),
            )
            .await;
        if games.is_empty() {
            warn!("No games found to process - this could mean:");
            warn!("  - No games are open for tipping");
            warn!("  - The page structure has changed");
            warn!("  - A consent overlay is still blocking the table");
            return Ok(RunReport::default());
        }
        info!("Found {} games to process", games.len());

        let report = self.scan_rows(table).await;

        self.gate.submit_all().await?;

        info!("Run finished: {report}");
        Ok(report)
    }

    /// Single forward pass over all table rows. The kickoff tracker is
    /// created fresh here; row order is the only thing that keeps its
    /// carry-forward correct.
    async fn scan_rows(&mut self, table: ElementHandle) -> RunReport {
        let mut report = RunReport::default();
        let mut tracker = TimeTracker::new(self.config.timezone);
        let mut rows = self
            .accessor
            .find_all(Scope::Within(table), &Locator::Rows)
            .await;
        let mut game_number = 0u32;

        let mut index = 0;
        while index < rows.len() {
            match self.resolve_row(table, &mut rows, index).await {
                Some((row, class)) => match rows::classify(class.as_deref()) {
                    RowKind::Header => {
                        debug!("Row {index} is a rowheader");
                        tracker.observe_header_row(&self.accessor, row).await;
                    }
                    RowKind::Data => {
                        game_number += 1;
                        let outcome = self.evaluate_data_row(row, game_number, &mut tracker).await;
                        log_outcome(game_number, &outcome);
                        report.record(&outcome);
                    }
                    RowKind::Other => {
                        trace!("Row {index} is neither header nor data, ignoring")
                    }
                },
                None => {
                    error!("Row {index} is inaccessible, counting as error");
                    report.record(&RowOutcome::Failed(RowFailure::Inaccessible));
                }
            }
            index += 1;
        }

        report
    }

    /// Looks up the row at `index` and its class attribute, re-resolving the
    /// whole row list once if the handle went stale since it was fetched.
    async fn resolve_row(
        &self,
        table: ElementHandle,
        rows: &mut Vec<ElementHandle>,
        index: usize,
    ) -> Option<(ElementHandle, Option<String>)> {
        let row = rows.get(index).copied()?;
        match self.accessor.try_attribute(row, "class").await {
            Ok(class) => Some((row, class)),
            Err(SessionError::Stale) => {
                debug!("Row {index} went stale, re-resolving the row list");
                *rows = self
                    .accessor
                    .find_all(Scope::Within(table), &Locator::Rows)
                    .await;
                let row = rows.get(index).copied()?;
                match self.accessor.try_attribute(row, "class").await {
                    Ok(class) => Some((row, class)),
                    Err(err) => {
                        warn!("Row {index} unreadable after re-resolution: {err}");
                        None
                    }
                }
            }
            Err(err) => {
                warn!("Could not read row {index} class: {err}");
                None
            }
        }
    }

    async fn evaluate_data_row(
        &mut self,
        row: ElementHandle,
        game_number: u32,
        tracker: &mut TimeTracker,
    ) -> RowOutcome {
        let kickoff = tracker.resolve_kickoff(&self.accessor, row).await;

        let Some((home_team, away_team)) = self.extractor.team_names(row).await else {
            return RowOutcome::Failed(RowFailure::MissingTeams);
        };
        info!(
            "Processing game {game_number}: {home_team} vs {away_team} | kickoff {}",
            kickoff.format(page::KICKOFF_FORMAT)
        );

        // Finished and already-tipped games are settled before any timing
        // check: their state, not the clock, decides them.
        let fields = match self.extractor.prediction_fields(row).await {
            FieldsState::Closed(result) => {
                return RowOutcome::Skipped(SkipReason::Finished(result));
            }
            FieldsState::AlreadyTipped { fields, home, away } => {
                if !self.config.overwrite_tips {
                    return RowOutcome::Skipped(SkipReason::AlreadyTipped { home, away });
                }
                debug!("Overwriting existing tip {home}:{away}");
                fields
            }
            FieldsState::Open(fields) => fields,
        };

        let now = rows::now_in(self.config.timezone);
        if kickoff <= now {
            return RowOutcome::Skipped(SkipReason::AlreadyStarted);
        }
        if kickoff - now > self.config.tip_threshold {
            return RowOutcome::Skipped(SkipReason::TooEarly);
        }

        let quotes = match self.extractor.quotes(row).await {
            Ok(quotes) => quotes,
            Err(failure) => return RowOutcome::Failed(failure),
        };
        debug!("Quotes: {quotes:?}");

        let game = GameRecord {
            home_team,
            away_team,
            kickoff,
            quotes,
        };
        let tip = calculate_tip(game.home_quote(), game.away_quote(), self.random.as_mut());
        info!("Calculated tip for {game}: {tip}");

        if !self.write_tip(&fields, tip).await {
            return RowOutcome::Failed(RowFailure::WriteFailed);
        }

        self.notify(&game, tip).await;
        RowOutcome::Tipped(tip)
    }

    /// Home field first, then away; a failed first write aborts before the
    /// second so the pair is never left crossed.
    async fn write_tip(&self, fields: &PredictionFields, tip: Tip) -> bool {
        if !self
            .accessor
            .clear_and_type(fields.home, &tip.home.to_string())
            .await
        {
            error!("Failed to enter home goals");
            return false;
        }
        if !self
            .accessor
            .clear_and_type(fields.away, &tip.away.to_string())
            .await
        {
            error!("Failed to enter away goals");
            return false;
        }
        debug!("Entered tip {tip}");
        true
    }

    /// Best effort: a slow or failing sink is logged and forgotten, its
    /// outcome never feeds back into the run.
    async fn notify(&self, game: &GameRecord, tip: Tip) {
        let notification = TipNotification::for_game(game, tip);
        match tokio::time::timeout(
            self.config.notify_timeout,
            self.sink.notify_tipped(&notification),
        )
        .await
        {
            Ok(Ok(())) => debug!("Notification sent for {game}"),
            Ok(Err(err)) => warn!("Notification for {game} failed: {err}"),
            Err(_) => warn!("Notification for {game} timed out"),
        }
    }

    /// A consent overlay sometimes covers the table after navigation. One
    /// cheap probe; absence is the normal case.
    async fn dismiss_consent_overlay(&self) {
        let Some(accept) = self
            .accessor
            .probe(
                Scope::Root,
                &Locator::ClassContains(page::CONSENT_ACCEPT_CLASS),
                self.config.consent_probe_timeout,
            )
            .await
        else {
            debug!("No consent overlay present");
            return;
        };
        if self.accessor.click(accept).await {
            info!("Consent overlay dismissed");
        } else {
            warn!("Consent overlay present but could not be dismissed");
        }
    }
}

fn log_outcome(game_number: u32, outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Tipped(tip) => info!("Game {game_number}: tipped {tip}"),
        RowOutcome::Skipped(reason) => info!("Game {game_number}: skipped ({reason})"),
        RowOutcome::Failed(failure) => error!("Game {game_number}: {failure}"),
    }
}
