//! Error types for ranking operations.

use tally_data::{DataError, MetricError};
use thiserror::Error;

/// Errors raised while building or running rankings.
#[derive(Debug, Error)]
pub enum RankingError {
    /// A rule was configured with an invalid shape.
    #[error("Invalid rule '{rule}': {reason}")]
    InvalidRule {
        /// Rule description
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// No rule with this description or name exists.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Underlying data error
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Failure of one rule on one contract. The ranking records it as NODATA.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleEvaluationError {
    /// A price-based metric had no price.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Reading the contract's data failed.
    #[error("Data error: {0}")]
    Data(String),

    /// The metric is not available for this contract.
    #[error("Metric unavailable: {0}")]
    Unavailable(String),
}

impl From<DataError> for RuleEvaluationError {
    fn from(e: DataError) -> Self {
        Self::Data(e.to_string())
    }
}

/// Result type for ranking operations.
pub type Result<T> = std::result::Result<T, RankingError>;
