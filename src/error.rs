use thiserror::Error;

use crate::config::SettingsError;

/// Construction-time failures from a table store. None of these are
/// recoverable; the engine cannot be built without both tables.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Source has no data rows: {0}")]
    SourceEmpty(String),

    #[error("Malformed source {source_name}: {reason}")]
    SourceMalformed { source_name: String, reason: String },

    #[error("Failed to read source {source_name}: {error}")]
    SourceUnreadable {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

/// Query-time outcomes. Each variant calls for a different fix, so they are
/// kept apart rather than folded into one generic error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("There is no country named '{0}'")]
    NotFound(String),

    #[error("There is no country with the measure '{0}'")]
    NoAdopters(String),

    #[error("Ratio is undefined: {0}")]
    Undefined(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to render chart: {0}")]
    Chart(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
