mod accessor;
mod extract;
mod pipeline;
mod rows;
mod submit;
mod tip;

pub use accessor::ResilientAccessor;
pub use extract::{FieldsState, GameRecordExtractor, PredictionFields};
pub use pipeline::TipPipeline;
pub use rows::{classify, RowKind, TimeTracker};
pub use submit::SubmissionGate;
pub use tip::{calculate_tip, FixedBit, RandomBit, ThreadRngBit};
