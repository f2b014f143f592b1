use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Saved copy of the tipping page to drive the run against
    #[arg(long, default_value = "tippabgabe.html")]
    pub page: PathBuf,

    /// Overwrite tips that are already entered
    #[clap(long, env = "OVERWRITE_TIPS")]
    pub overwrite_tips: bool,

    /// Only tip games that kick off within this many hours
    #[clap(long, env = "KICKTIPP_HOURS_UNTIL_GAME", default_value = "2")]
    pub hours_until_game: u32,

    /// Time zone the page renders kickoff times in
    #[clap(long, env = "KICKTIPP_TIMEZONE", default_value = "Europe/Berlin")]
    pub timezone: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
