mod log_sink;
mod snapshot;

pub use log_sink::LogSink;
pub use snapshot::SnapshotSession;
