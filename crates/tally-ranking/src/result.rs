//! Outcome of one rule on one contract.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// State of a [`RankingResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RankingFlag {
    /// Not decided yet; constraints that pass return this.
    #[default]
    #[display("NONE")]
    None,
    /// Scored.
    #[display("OK")]
    Ok,
    /// The metric is missing.
    #[display("NODATA")]
    NoData,
    /// A precondition of the rule failed.
    #[display("CONSTRAINT")]
    Constraint,
}

/// Value, normalized score and maximum score of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RankingResult {
    value: f64,
    score: f64,
    max_score: f64,
    flag: RankingFlag,
}

impl RankingResult {
    /// Undecided result.
    pub const fn none() -> Self {
        Self {
            value: 0.0,
            score: 0.0,
            max_score: 0.0,
            flag: RankingFlag::None,
        }
    }

    /// Missing metric: NaN value, no score.
    pub const fn no_data() -> Self {
        Self {
            value: f64::NAN,
            score: 0.0,
            max_score: 0.0,
            flag: RankingFlag::NoData,
        }
    }

    /// Failed precondition. The value and max score are recorded, the score
    /// is 0.
    pub const fn constraint(value: f64, max_score: f64) -> Self {
        Self {
            value,
            score: 0.0,
            max_score,
            flag: RankingFlag::Constraint,
        }
    }

    /// Scored result; `score` is already normalized to `[0, 1]`.
    pub const fn ok(value: f64, score: f64, max_score: f64) -> Self {
        Self {
            value,
            score,
            max_score,
            flag: RankingFlag::Ok,
        }
    }

    /// Metric value.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Normalized score.
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Maximum raw score of the rule.
    pub const fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Flag.
    pub const fn flag(&self) -> RankingFlag {
        self.flag
    }

    /// Whether the result is undecided.
    pub fn is_none(&self) -> bool {
        self.flag == RankingFlag::None
    }

    /// Whether the result counts towards the relative score.
    pub fn counts(&self) -> bool {
        self.flag == RankingFlag::Ok && self.max_score > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(RankingResult::default().is_none());
        assert!(RankingResult::no_data().value().is_nan());
        assert_eq!(RankingResult::no_data().flag(), RankingFlag::NoData);

        let constrained = RankingResult::constraint(-3.0, 2.0);
        assert_eq!(constrained.score(), 0.0);
        assert_eq!(constrained.max_score(), 2.0);
        assert!(!constrained.counts());

        assert!(RankingResult::ok(12.0, 0.5, 2.0).counts());
        assert!(!RankingResult::ok(12.0, 0.0, 0.0).counts());
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(RankingFlag::NoData.to_string(), "NODATA");
        assert_eq!(RankingFlag::Constraint.to_string(), "CONSTRAINT");
    }
}
