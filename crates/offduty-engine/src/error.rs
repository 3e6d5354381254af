//! Error types for offduty-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid time window {start}-{end}: {reason}")]
    InvalidWindow { start: u16, end: u16, reason: String },

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid day of week: {0}")]
    InvalidDay(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
