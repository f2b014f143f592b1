use thiserror::Error;

#[derive(Error, Debug)]
pub enum TipError {
    #[error("Game table not found in document")]
    TableNotFound,
    #[error("Submission failed: {0}")]
    Submission(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Notification error: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, TipError>;
