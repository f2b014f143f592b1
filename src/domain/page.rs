//! Contract of the tipping page. Every selector the engine relies on is
//! collected here so a markup change stays a one-file fix.

/// `id` of the game table.
pub const GAME_TABLE_ID: &str = "tippabgabeSpiele";

/// Row `class` marking a header row that announces a shared kickoff time.
pub const HEADER_ROW_CLASS: &str = "rowheader";
/// Row `class` marking a data row holding exactly one match.
pub const DATA_ROW_CLASS: &str = "datarow";
/// Cell `class` on time cells that merely echo the preceding header time.
pub const HIDDEN_CLASS: &str = "hide";

/// 1-based cell positions within a data row.
pub const TIME_CELL: usize = 1;
pub const HOME_TEAM_CELL: usize = 2;
pub const AWAY_TEAM_CELL: usize = 3;
pub const RESULT_CELL: usize = 4;

/// `name` fragments of the editable prediction inputs.
pub const HOME_TIP_NAME: &str = "heimTipp";
pub const AWAY_TIP_NAME: &str = "gastTipp";

/// `class` fragment of the legacy element carrying all three quotes as text.
pub const QUOTE_LINK_CLASS: &str = "quote-link";
/// Prefix in front of the legacy quote text.
pub const QUOTE_PREFIX: &str = "Quote:";
/// `class` fragment of one entry in the structured quote markup.
pub const QUOTE_ENTRY_CLASS: &str = "quote-entry";
/// Attribute naming the outcome (`1`, `X`, `2`) of a structured quote entry.
pub const QUOTE_OUTCOME_ATTR: &str = "data-outcome";

/// `name` of the control submitting the whole form.
pub const SUBMIT_NAME: &str = "submitbutton";
/// `class` fragment of the consent overlay's accept control.
pub const CONSENT_ACCEPT_CLASS: &str = "message-accept";

/// Kickoff timestamps as the page renders them, e.g. `01.03.25 15:30`.
pub const KICKOFF_FORMAT: &str = "%d.%m.%y %H:%M";
