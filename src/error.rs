use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("revision interval must be positive, got {0}")]
    InvalidInterval(i64),

    #[error("card store unavailable: {0}")]
    StoreUnavailable(#[source] rusqlite::Error),

    #[error("card not found: {0}")]
    NotFound(String),

    #[error("card {0} must not be empty")]
    EmptyField(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
