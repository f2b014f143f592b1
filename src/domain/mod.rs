mod game;
mod notify;
mod report;
mod session;

pub mod page;

pub use game::{GameRecord, Tip};
pub use notify::{NotificationSink, TipNotification};
pub use report::{RowFailure, RowOutcome, RunReport, SkipReason};
pub use session::{
    DocumentSession, ElementHandle, Locator, Scope, SessionError, SessionResult,
};
