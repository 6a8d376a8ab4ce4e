//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reading and reconciling financial data.
#[derive(Debug, Error)]
pub enum DataError {
    /// No known label with numeric data was found for a field.
    #[error("No label found for {field}{}", ticker_suffix(.ticker))]
    LabelNotFound {
        /// Canonical field (or sheet kind) being resolved
        field: String,
        /// Ticker of the document, if known
        ticker: Option<String>,
    },

    /// Several known labels matched and no combination rule resolved them.
    #[error("Ambiguous labels for {field}{}: {candidates:?}", ticker_suffix(.ticker))]
    AmbiguousLabel {
        /// Canonical field (or sheet kind) being resolved
        field: String,
        /// Ticker of the document, if known
        ticker: Option<String>,
        /// Every candidate label that was found
        candidates: Vec<String>,
    },

    /// A resolved label maps to several rows with conflicting values.
    #[error("Ambiguous values for {field} under label '{label}': {values:?}")]
    AmbiguousValue {
        /// Canonical field being read
        field: String,
        /// Resolved label
        label: String,
        /// Conflicting values
        values: Vec<f64>,
    },

    /// A data source had nothing for a ticker.
    #[error("Missing data for {ticker}: {reason}")]
    MissingTickerData {
        /// Ticker that was queried
        ticker: String,
        /// Reason for missing data
        reason: String,
    },

    /// Chart-of-accounts type is not supported.
    #[error("Invalid chart-of-accounts type: {0}")]
    InvalidCoaType(String),

    /// Field name or line-item code is not declared for a statement.
    #[error("Unknown field '{field}' for {statement} statement")]
    UnknownField {
        /// Field name or code
        field: String,
        /// Statement kind
        statement: String,
    },

    /// Date could not be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn ticker_suffix(ticker: &Option<String>) -> String {
    ticker
        .as_ref()
        .map(|t| format!(" ({t})"))
        .unwrap_or_default()
}

impl DataError {
    /// Returns true for failures that invalidate a whole document.
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::LabelNotFound { .. } | Self::AmbiguousLabel { .. } | Self::AmbiguousValue { .. }
        )
    }
}
