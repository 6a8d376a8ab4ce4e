//! Scored ranking rules.
//!
//! A rule reads one metric of a contract through an [`Accessor`], runs its
//! constraint chain and maps the value onto a score through sorted cutoffs.
//! Rules hold no per-contract state and are shared freely across threads.

use crate::error::{RankingError, Result, RuleEvaluationError};
use crate::result::{RankingFlag, RankingResult};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tally_data::{Contract, Selection};
use tracing::debug;

/// Reads one metric value of a contract for a selection.
pub type Accessor =
    Arc<dyn Fn(&Contract, &Selection) -> std::result::Result<f64, RuleEvaluationError> + Send + Sync>;

/// Wrap a closure as an [`Accessor`].
pub fn accessor<F>(f: F) -> Accessor
where
    F: Fn(&Contract, &Selection) -> std::result::Result<f64, RuleEvaluationError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Accessor over a per-period series, picking the selected period.
pub fn series_accessor<F>(series: F) -> Accessor
where
    F: Fn(&Contract) -> Vec<f64> + Send + Sync + 'static,
{
    accessor(move |contract, at| Ok(contract.value_at(&series(contract), at)))
}

/// Comparison of a value constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `value > threshold`
    #[display(">")]
    Greater,
    /// `value >= threshold`
    #[display(">=")]
    GreaterOrEqual,
    /// `value < threshold`
    #[display("<")]
    Less,
    /// `value <= threshold`
    #[display("<=")]
    LessOrEqual,
    /// `value == threshold`
    #[display("==")]
    Equal,
    /// `value != threshold`
    #[display("!=")]
    NotEqual,
}

impl Comparison {
    /// Whether the comparison holds. Any comparison with NaN except
    /// [`Self::NotEqual`] fails.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Greater => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::Less => value < threshold,
            Self::LessOrEqual => value <= threshold,
            Self::Equal => value == threshold,
            Self::NotEqual => value != threshold,
        }
    }
}

/// One link of a rule's constraint chain.
#[derive(Clone)]
pub enum Constraint {
    /// Flags NODATA when the value is not finite.
    Finite(Accessor),
    /// Flags CONSTRAINT when `comparison(value, threshold)` does not hold.
    Value {
        /// Human-readable description, e.g. `"PE > 0"`.
        description: String,
        /// Metric being constrained.
        accessor: Accessor,
        /// Comparison applied to the metric.
        comparison: Comparison,
        /// Threshold of the comparison.
        threshold: f64,
    },
}

impl Constraint {
    /// Value constraint.
    pub fn value(
        description: impl Into<String>,
        accessor: Accessor,
        comparison: Comparison,
        threshold: f64,
    ) -> Self {
        Self::Value {
            description: description.into(),
            accessor,
            comparison,
            threshold,
        }
    }

    /// Check the constraint; a passing constraint returns an undecided result.
    pub fn check(
        &self,
        contract: &Contract,
        at: &Selection,
    ) -> std::result::Result<RankingResult, RuleEvaluationError> {
        match self {
            Self::Finite(accessor) => {
                let value = accessor(contract, at)?;
                Ok(if value.is_finite() {
                    RankingResult::none()
                } else {
                    RankingResult::no_data()
                })
            }
            Self::Value {
                accessor,
                comparison,
                threshold,
                ..
            } => {
                let value = accessor(contract, at)?;
                Ok(if comparison.holds(value, *threshold) {
                    RankingResult::none()
                } else {
                    RankingResult::constraint(value, 0.0)
                })
            }
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(_) => f.write_str("Finite"),
            Self::Value {
                description,
                comparison,
                threshold,
                ..
            } => f
                .debug_struct("Value")
                .field("description", description)
                .field("comparison", comparison)
                .field("threshold", threshold)
                .finish(),
        }
    }
}

/// A scoring rule.
pub trait RankingObject: fmt::Debug + Send + Sync {
    /// Description, also the column name in ranking tables.
    fn description(&self) -> &str;

    /// Score cutoffs, if the rule has any.
    fn cutoffs(&self) -> &[f64] {
        &[]
    }

    /// Evaluate the rule on one contract.
    ///
    /// # Errors
    ///
    /// Returns an error when a metric cannot be computed.
    fn evaluate(
        &self,
        contract: &Contract,
        at: &Selection,
    ) -> std::result::Result<RankingResult, RuleEvaluationError>;

    /// Evaluate the rule, recording evaluation failures as NODATA.
    fn rank(&self, contract: &Contract, at: &Selection) -> RankingResult {
        self.evaluate(contract, at).unwrap_or_else(|e| {
            debug!(rule = self.description(), ticker = contract.ticker(), error = %e, "no data");
            RankingResult::no_data()
        })
    }
}

/// Rule scoring a metric through sorted cutoffs.
///
/// With cutoffs `[c0, .., cn]` and scores `[s0, .., sn+1]` a value below `c0`
/// scores `s0`, a value in `[ci, ci+1)` scores `si+1` and a value at or above
/// `cn` scores `sn+1`. The returned score is divided by the largest score.
#[derive(Clone)]
pub struct RangeRankingObject {
    description: String,
    accessor: Accessor,
    cutoffs: Vec<f64>,
    scores: Vec<f64>,
    max_score: f64,
    constraints: Vec<Constraint>,
}

impl RangeRankingObject {
    /// Create a rule. A finiteness guard on the accessor is always the first
    /// constraint.
    ///
    /// # Errors
    ///
    /// [`RankingError::InvalidRule`] when the cutoffs are empty, not finite or
    /// not sorted, or when there is not exactly one more score than cutoffs.
    pub fn new(
        description: impl Into<String>,
        accessor: Accessor,
        cutoffs: Vec<f64>,
        scores: Vec<f64>,
    ) -> Result<Self> {
        let description = description.into();
        let invalid = |reason: String| RankingError::InvalidRule {
            rule: description.clone(),
            reason,
        };
        if cutoffs.is_empty() {
            return Err(invalid("no cutoffs".to_string()));
        }
        if cutoffs.iter().any(|c| !c.is_finite()) || scores.iter().any(|s| !s.is_finite()) {
            return Err(invalid("cutoffs and scores must be finite".to_string()));
        }
        if cutoffs.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid(format!("cutoffs {cutoffs:?} are not sorted")));
        }
        if scores.len() != cutoffs.len() + 1 {
            return Err(invalid(format!(
                "{} scores for {} cutoffs",
                scores.len(),
                cutoffs.len()
            )));
        }

        let max_score = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            constraints: vec![Constraint::Finite(Arc::clone(&accessor))],
            description,
            accessor,
            cutoffs,
            scores,
            max_score,
        })
    }

    /// Append a constraint to the chain.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Scores parallel to the cutoff intervals.
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Largest score.
    pub const fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Constraint chain, finiteness guard first.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}

/// Raw score of a value: `scores[i]` for the interval `[cutoffs[i - 1], cutoffs[i])`.
///
/// # Errors
///
/// [`RankingError::InvalidRule`] unless there is exactly one more score than
/// cutoffs.
pub fn range_score(value: f64, cutoffs: &[f64], scores: &[f64]) -> Result<f64> {
    if scores.len() != cutoffs.len() + 1 {
        return Err(RankingError::InvalidRule {
            rule: "range score".to_string(),
            reason: format!("{} scores for {} cutoffs", scores.len(), cutoffs.len()),
        });
    }
    Ok(scores[cutoffs.partition_point(|c| *c <= value)])
}

impl RankingObject for RangeRankingObject {
    fn description(&self) -> &str {
        &self.description
    }

    fn cutoffs(&self) -> &[f64] {
        &self.cutoffs
    }

    fn evaluate(
        &self,
        contract: &Contract,
        at: &Selection,
    ) -> std::result::Result<RankingResult, RuleEvaluationError> {
        for constraint in &self.constraints {
            let result = constraint.check(contract, at)?;
            match result.flag() {
                RankingFlag::None => continue,
                RankingFlag::NoData => return Ok(result),
                _ => {
                    let value = (self.accessor)(contract, at)?;
                    return Ok(RankingResult::constraint(value, self.max_score));
                }
            }
        }

        let value = (self.accessor)(contract, at)?;
        let raw = range_score(value, &self.cutoffs, &self.scores)
            .map_err(|e| RuleEvaluationError::Unavailable(e.to_string()))?;
        let score = if self.max_score > 0.0 {
            raw / self.max_score
        } else {
            0.0
        };
        Ok(RankingResult::ok(value, score, self.max_score))
    }
}

impl fmt::Debug for RangeRankingObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeRankingObject")
            .field("description", &self.description)
            .field("cutoffs", &self.cutoffs)
            .field("scores", &self.scores)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tally_data::BalanceField;

    fn constant(value: f64) -> Accessor {
        accessor(move |_, _| Ok(value))
    }

    #[rstest]
    #[case(-5.0, 0.0)]
    #[case(9.999, 0.0)]
    #[case(10.0, 1.0)]
    #[case(29.999, 1.0)]
    #[case(30.0, 2.0)]
    #[case(1e9, 2.0)]
    fn test_range_score_boundaries(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(range_score(value, &[10.0, 30.0], &[0.0, 1.0, 2.0]).unwrap(), expected);
    }

    #[test]
    fn test_range_score_multiple_intervals() {
        let cutoffs = [0.0, 10.0, 20.0];
        let scores = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(range_score(5.0, &cutoffs, &scores).unwrap(), 1.0);
        assert_eq!(range_score(15.0, &cutoffs, &scores).unwrap(), 2.0);
        assert_eq!(range_score(20.0, &cutoffs, &scores).unwrap(), 3.0);
    }

    #[test]
    fn test_range_score_rejects_mismatched_shapes() {
        assert!(matches!(
            range_score(5.0, &[10.0, 30.0], &[0.0, 1.0]),
            Err(RankingError::InvalidRule { .. })
        ));
        assert!(range_score(5.0, &[], &[]).is_err());
    }

    #[rstest]
    #[case(vec![], vec![1.0])]
    #[case(vec![30.0, 10.0], vec![0.0, 1.0, 2.0])]
    #[case(vec![10.0, 30.0], vec![0.0, 1.0])]
    #[case(vec![f64::NAN], vec![0.0, 1.0])]
    fn test_invalid_shapes(#[case] cutoffs: Vec<f64>, #[case] scores: Vec<f64>) {
        let err = RangeRankingObject::new("rule", constant(1.0), cutoffs, scores).unwrap_err();
        assert!(matches!(err, RankingError::InvalidRule { .. }));
    }

    #[test]
    fn test_normalized_score() {
        let rule = RangeRankingObject::new("rule", constant(20.0), vec![10.0, 30.0], vec![0.0, 1.0, 2.0])
            .unwrap();
        let result = rule.rank(&Contract::new("ACME"), &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::Ok);
        assert_eq!(result.score(), 0.5);
        assert_eq!(result.max_score(), 2.0);
        assert_eq!(result.value(), 20.0);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_non_finite_is_no_data(#[case] value: f64) {
        let rule = RangeRankingObject::new("rule", constant(value), vec![10.0], vec![0.0, 1.0]).unwrap();
        let result = rule.rank(&Contract::new("ACME"), &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::NoData);
        assert!(result.value().is_nan());
        assert_eq!(result.max_score(), 0.0);
    }

    #[test]
    fn test_constraint_records_value_and_max_score() {
        let rule = RangeRankingObject::new("PEG", constant(-0.5), vec![0.8, 1.2], vec![2.0, 1.0, 0.0])
            .unwrap()
            .with_constraint(Constraint::value("PE > 0", constant(-4.0), Comparison::Greater, 0.0));
        let result = rule.rank(&Contract::new("ACME"), &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::Constraint);
        assert_eq!(result.value(), -0.5);
        assert_eq!(result.max_score(), 2.0);
        assert_eq!(result.score(), 0.0);
    }

    #[test]
    fn test_first_failing_constraint_short_circuits() {
        let failing = accessor(|_, _| Err(RuleEvaluationError::Unavailable("never reached".into())));
        let rule = RangeRankingObject::new("rule", constant(1.0), vec![0.0], vec![0.0, 1.0])
            .unwrap()
            .with_constraint(Constraint::value("x < 0", constant(1.0), Comparison::Less, 0.0))
            .with_constraint(Constraint::value("unreachable", failing, Comparison::Less, 0.0));
        let result = rule.rank(&Contract::new("ACME"), &Selection::latest());
        assert_eq!(result.flag(), RankingFlag::Constraint);
    }

    #[test]
    fn test_evaluation_error_is_no_data() {
        let failing = accessor(|c, _| Ok(c.price_at(None)?));
        let rule = RangeRankingObject::new("price", failing, vec![0.0], vec![0.0, 1.0]).unwrap();
        let contract = Contract::new("ACME");
        assert!(rule.evaluate(&contract, &Selection::latest()).is_err());
        assert_eq!(rule.rank(&contract, &Selection::latest()).flag(), RankingFlag::NoData);
    }

    #[test]
    fn test_series_accessor_picks_selected_period() {
        let mut contract = Contract::new("ACME");
        contract
            .balance_mut()
            .set_field(BalanceField::TotalAssets, vec![300.0, 200.0])
            .unwrap();
        let assets = series_accessor(|c| c.balance().total_assets().to_vec());
        assert_eq!(assets(&contract, &Selection::latest()).unwrap(), 300.0);
        assert_eq!(
            assets(&contract, &Selection::latest().with_years_back(1)).unwrap(),
            200.0
        );
        assert!(assets(&contract, &Selection::latest().with_years_back(2)).unwrap().is_nan());
    }

    #[test]
    fn test_comparison_with_nan_fails() {
        assert!(!Comparison::Greater.holds(f64::NAN, 0.0));
        assert!(Comparison::NotEqual.holds(f64::NAN, 0.0));
        assert_eq!(Comparison::GreaterOrEqual.to_string(), ">=");
    }
}
