//! Error types for tally runs.

use tally_data::DataError;
use tally_output::ExportError;
use tally_ranking::RankingError;
use thiserror::Error;

/// Errors that can occur while configuring or running tally.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Reading or reconciling data failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Building rules or filters failed.
    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    /// Writing results failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch collected more per-ticker errors than allowed.
    #[error("{} errors exceed the budget of {max}; last: {}", .errors.len(), .errors.last().map(String::as_str).unwrap_or_default())]
    ErrorBudgetExceeded {
        /// Allowed number of errors
        max: usize,
        /// Every error collected so far
        errors: Vec<String>,
    },
}
