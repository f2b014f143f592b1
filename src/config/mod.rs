use std::time::Duration;

use chrono_tz::Tz;
use clap::Parser;

use crate::error::{Result, TipError};

mod cli;

pub use cli::Args;

/// How long one `find` waits for the document to produce an element.
pub const DEFAULT_FIND_TIMEOUT: Duration = Duration::from_secs(10);
/// How often `find` re-polls before giving up.
pub const DEFAULT_FIND_ATTEMPTS: u32 = 3;
/// Pause between retry attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Click attempts on a present but momentarily non-interactable element.
pub const DEFAULT_CLICK_ATTEMPTS: u32 = 3;

/// Short single-attempt wait for the consent overlay; a clean page should not
/// pay the full find timeout for it.
pub const CONSENT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);
/// Pause before looking for the submit control, so late form updates settle.
pub const SUBMIT_SETTLE_DELAY: Duration = Duration::from_secs(1);
/// Pause after scrolling the submit control into view.
pub const SCROLL_PAUSE: Duration = Duration::from_millis(500);
/// Upper bound on one notification delivery.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry tuning shared by every accessor operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub find_timeout: Duration,
    pub find_attempts: u32,
    pub retry_delay: Duration,
    pub click_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            find_timeout: DEFAULT_FIND_TIMEOUT,
            find_attempts: DEFAULT_FIND_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            click_attempts: DEFAULT_CLICK_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Same attempt counts, zero waiting. Suits sessions that never lag,
    /// like the snapshot adapter.
    pub fn immediate() -> Self {
        Self {
            find_timeout: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub args: Args,
    pub overwrite_tips: bool,
    /// Games further out than this are left untouched.
    pub tip_threshold: chrono::Duration,
    /// Zone all kickoff times and "now" comparisons are resolved in.
    pub timezone: Tz,
    pub retry: RetryPolicy,
    pub consent_probe_timeout: Duration,
    pub submit_settle_delay: Duration,
    pub scroll_pause: Duration,
    pub notify_timeout: Duration,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let timezone: Tz = args
            .timezone
            .parse()
            .map_err(|_| TipError::Config(format!("Unknown time zone: {}", args.timezone)))?;

        Ok(Self {
            overwrite_tips: args.overwrite_tips,
            tip_threshold: chrono::Duration::hours(i64::from(args.hours_until_game)),
            timezone,
            retry: RetryPolicy::default(),
            consent_probe_timeout: CONSENT_PROBE_TIMEOUT,
            submit_settle_delay: SUBMIT_SETTLE_DELAY,
            scroll_pause: SCROLL_PAUSE,
            notify_timeout: NOTIFY_TIMEOUT,
            args,
        })
    }
}
