//! Sequential screening filters.
//!
//! Each filter runs on the contracts the previous one kept. Limit filters
//! drop values at or beyond their bounds and count how many fell on each
//! side; equality filters keep contracts whose value matches, or does not
//! match, a reference.

use crate::error::{RankingError, Result, RuleEvaluationError};
use crate::metrics;
use crate::rule::Accessor;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tally_data::{Contract, Contracts, Selection};
use tracing::{debug, info};

/// Value read by an equality filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScreenValue {
    /// Numeric value.
    Number(f64),
    /// Text value, compared case-insensitively.
    Text(String),
}

impl ScreenValue {
    fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl fmt::Display for ScreenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Reads the value an equality filter compares.
pub type ValueAccessor = Arc<
    dyn Fn(&Contract, &Selection) -> std::result::Result<ScreenValue, RuleEvaluationError>
        + Send
        + Sync,
>;

/// Discards contracts whose value is at or below `min`, at or above `max`,
/// or infinite. NaN values are kept.
#[derive(Clone)]
pub struct LimitFilter {
    description: String,
    accessor: Accessor,
    min: f64,
    max: f64,
}

impl LimitFilter {
    /// Create a limit filter; a missing bound is open.
    pub fn new(
        description: impl Into<String>,
        accessor: Accessor,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self {
            description: description.into(),
            accessor,
            min: min.unwrap_or(f64::NEG_INFINITY),
            max: max.unwrap_or(f64::INFINITY),
        }
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Lower bound.
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> f64 {
        self.max
    }

    fn verdict(&self, contract: &Contract, at: &Selection) -> Verdict {
        let value = match (self.accessor)(contract, at) {
            Ok(value) => value,
            Err(e) => {
                debug!(filter = %self.description, ticker = contract.ticker(), error = %e, "value unavailable, kept");
                return Verdict::Keep;
            }
        };
        if value.is_nan() {
            Verdict::Keep
        } else if value.is_infinite() {
            Verdict::Discard
        } else if value <= self.min {
            Verdict::Below
        } else if value >= self.max {
            Verdict::Above
        } else {
            Verdict::Keep
        }
    }
}

impl fmt::Debug for LimitFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitFilter")
            .field("description", &self.description)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    Below,
    Above,
    Discard,
}

#[derive(Debug, Clone, PartialEq)]
enum Reference {
    EqualTo(ScreenValue),
    NotEqualTo(ScreenValue),
}

/// Keeps contracts whose value equals `equal_to`, or differs from
/// `not_equal_to`.
#[derive(Clone)]
pub struct EqualityFilter {
    description: String,
    accessor: ValueAccessor,
    reference: Reference,
}

impl EqualityFilter {
    /// Create an equality filter.
    ///
    /// # Errors
    ///
    /// [`RankingError::InvalidRule`] unless exactly one of `equal_to` and
    /// `not_equal_to` is given.
    pub fn new(
        description: impl Into<String>,
        accessor: ValueAccessor,
        equal_to: Option<ScreenValue>,
        not_equal_to: Option<ScreenValue>,
    ) -> Result<Self> {
        let description = description.into();
        let reference = match (equal_to, not_equal_to) {
            (Some(v), None) => Reference::EqualTo(v),
            (None, Some(v)) => Reference::NotEqualTo(v),
            _ => {
                return Err(RankingError::InvalidRule {
                    rule: description,
                    reason: "exactly one of equal_to and not_equal_to is required".to_string(),
                });
            }
        };
        Ok(Self {
            description,
            accessor,
            reference,
        })
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn keeps(&self, contract: &Contract, at: &Selection) -> bool {
        let Ok(value) = (self.accessor)(contract, at) else {
            return false;
        };
        match &self.reference {
            Reference::EqualTo(v) => value.matches(v),
            Reference::NotEqualTo(v) => !value.matches(v),
        }
    }
}

impl fmt::Debug for EqualityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityFilter")
            .field("description", &self.description)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

/// One screening step.
#[derive(Debug, Clone)]
pub enum ScreenFilter {
    /// Bounds on a numeric value.
    Limit(LimitFilter),
    /// Match on a value.
    Equality(EqualityFilter),
}

impl ScreenFilter {
    /// Description.
    pub fn description(&self) -> &str {
        match self {
            Self::Limit(f) => f.description(),
            Self::Equality(f) => f.description(),
        }
    }
}

impl From<LimitFilter> for ScreenFilter {
    fn from(f: LimitFilter) -> Self {
        Self::Limit(f)
    }
}

impl From<EqualityFilter> for ScreenFilter {
    fn from(f: EqualityFilter) -> Self {
        Self::Equality(f)
    }
}

/// Configured filter over a named metric.
///
/// Limit filters read a per-period series or a descriptive scalar of
/// [`metrics`]; equality filters may also read a descriptive text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Limit filter.
    Limit {
        /// Metric name.
        metric: String,
        /// Lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound.
        #[serde(default)]
        max: Option<f64>,
    },
    /// Equality filter.
    Equality {
        /// Metric name.
        metric: String,
        /// Required value.
        #[serde(default)]
        equal_to: Option<ScreenValue>,
        /// Excluded value.
        #[serde(default)]
        not_equal_to: Option<ScreenValue>,
    },
}

impl FilterSpec {
    /// Build the filter.
    ///
    /// # Errors
    ///
    /// [`RankingError::UnknownRule`] for an unknown metric and
    /// [`RankingError::InvalidRule`] for a malformed equality filter.
    pub fn build(&self) -> Result<ScreenFilter> {
        match self {
            Self::Limit { metric, min, max } => {
                let accessor = numeric_accessor(metric)
                    .ok_or_else(|| RankingError::UnknownRule(metric.clone()))?;
                Ok(LimitFilter::new(metric.as_str(), accessor, *min, *max).into())
            }
            Self::Equality {
                metric,
                equal_to,
                not_equal_to,
            } => {
                let accessor = value_accessor(metric)
                    .ok_or_else(|| RankingError::UnknownRule(metric.clone()))?;
                Ok(EqualityFilter::new(
                    metric.as_str(),
                    accessor,
                    equal_to.clone(),
                    not_equal_to.clone(),
                )?
                .into())
            }
        }
    }
}

fn numeric_accessor(metric: &str) -> Option<Accessor> {
    if let Some(series) = metrics::series(metric) {
        return Some(crate::rule::series_accessor(series));
    }
    metrics::scalar(metric).map(|scalar| crate::rule::accessor(move |c, _| Ok(scalar(c))))
}

fn value_accessor(metric: &str) -> Option<ValueAccessor> {
    if let Some(text) = metrics::text(metric) {
        return Some(Arc::new(
            move |c: &Contract, _: &Selection| -> std::result::Result<ScreenValue, RuleEvaluationError> {
                Ok(ScreenValue::Text(text(c)))
            },
        ));
    }
    let numeric = numeric_accessor(metric)?;
    Some(Arc::new(move |c: &Contract, at: &Selection| {
        numeric(c, at).map(ScreenValue::Number)
    }))
}

/// Counts of one screening step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    /// Filter description.
    pub description: String,
    /// Contracts discarded for being at or below the lower bound.
    pub below: usize,
    /// Contracts discarded for being at or above the upper bound.
    pub above: usize,
    /// Contracts discarded in total.
    pub discarded: usize,
    /// Contracts left after the step.
    pub remaining: usize,
}

/// Contracts that passed every filter, and the per-filter counts.
#[derive(Debug, Clone)]
pub struct ScreenResult {
    /// Remaining contracts.
    pub contracts: Contracts,
    /// One outcome per filter, in order.
    pub outcomes: Vec<FilterOutcome>,
    initial: usize,
}

impl ScreenResult {
    /// Number of contracts before screening.
    pub const fn initial(&self) -> usize {
        self.initial
    }

    /// Human-readable screening report.
    pub fn report(&self) -> String {
        let mut out = format!("Screening {} contracts\n", self.initial);
        for o in &self.outcomes {
            let _ = write!(out, "{}: discarded {}", o.description, o.discarded);
            if o.below > 0 || o.above > 0 {
                let _ = write!(out, " ({} below, {} above)", o.below, o.above);
            }
            let _ = writeln!(out, ", {} remaining", o.remaining);
        }
        let _ = write!(out, "{} contracts remaining", self.contracts.len());
        out
    }
}

/// Runs filters over contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Screener;

impl Screener {
    /// Apply filters in order.
    pub fn screen(contracts: &Contracts, filters: &[ScreenFilter], at: &Selection) -> ScreenResult {
        let initial = contracts.len();
        let mut remaining: Vec<&Contract> = contracts.iter().collect();
        let mut outcomes = Vec::with_capacity(filters.len());

        for filter in filters {
            let before = remaining.len();
            let (mut below, mut above) = (0, 0);
            remaining.retain(|c| match filter {
                ScreenFilter::Limit(limit) => match limit.verdict(c, at) {
                    Verdict::Keep => true,
                    Verdict::Below => {
                        below += 1;
                        false
                    }
                    Verdict::Above => {
                        above += 1;
                        false
                    }
                    Verdict::Discard => false,
                },
                ScreenFilter::Equality(equality) => equality.keeps(c, at),
            });
            let outcome = FilterOutcome {
                description: filter.description().to_string(),
                below,
                above,
                discarded: before - remaining.len(),
                remaining: remaining.len(),
            };
            debug!(filter = %outcome.description, discarded = outcome.discarded, "screened");
            outcomes.push(outcome);
        }

        info!(initial, remaining = remaining.len(), "screening done");
        ScreenResult {
            contracts: remaining.into_iter().cloned().collect(),
            outcomes,
            initial,
        }
    }

    /// Build filters from specs and apply them.
    ///
    /// # Errors
    ///
    /// The first spec that fails to build.
    pub fn screen_specs(
        contracts: &Contracts,
        specs: &[FilterSpec],
        at: &Selection,
    ) -> Result<ScreenResult> {
        let filters = specs.iter().map(FilterSpec::build).collect::<Result<Vec<_>>>()?;
        Ok(Self::screen(contracts, &filters, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::accessor;
    use tally_data::ContractInfo;

    fn universe() -> Contracts {
        [
            ("AAA", "Tech", 5.0),
            ("BBB", "Tech", 10.0),
            ("CCC", "Energy", 15.0),
            ("DDD", "Energy", 20.0),
            ("EEE", "Finance", f64::NAN),
            ("FFF", "Finance", f64::INFINITY),
        ]
        .into_iter()
        .map(|(ticker, sector, price)| {
            let mut info = ContractInfo::new(ticker, sector);
            info.price = price;
            Contract::new(ticker).with_info(info)
        })
        .collect()
    }

    fn price_filter(min: Option<f64>, max: Option<f64>) -> ScreenFilter {
        LimitFilter::new("Price", accessor(|c, _| Ok(c.info().price)), min, max).into()
    }

    #[test]
    fn test_limit_filter_bounds_are_exclusive() {
        let result = Screener::screen(&universe(), &[price_filter(Some(5.0), Some(20.0))], &Selection::latest());
        assert_eq!(result.contracts.tickers().collect::<Vec<_>>(), vec!["BBB", "CCC", "EEE"]);
        let outcome = &result.outcomes[0];
        assert_eq!(outcome.below, 1);
        assert_eq!(outcome.above, 1);
        assert_eq!(outcome.discarded, 3);
        assert_eq!(outcome.remaining, 3);
    }

    #[test]
    fn test_open_bounds_drop_only_infinite() {
        let result = Screener::screen(&universe(), &[price_filter(None, None)], &Selection::latest());
        assert_eq!(result.contracts.len(), 5);
        assert!(!result.contracts.contains("FFF"));
        assert_eq!(result.outcomes[0].below + result.outcomes[0].above, 0);
    }

    #[test]
    fn test_equality_filter_keeps_matching() {
        let spec = FilterSpec::Equality {
            metric: "sector".to_string(),
            equal_to: Some(ScreenValue::Text("energy".to_string())),
            not_equal_to: None,
        };
        let result = Screener::screen_specs(&universe(), &[spec], &Selection::latest()).unwrap();
        assert_eq!(result.contracts.tickers().collect::<Vec<_>>(), vec!["CCC", "DDD"]);
    }

    #[test]
    fn test_not_equal_filter() {
        let spec = FilterSpec::Equality {
            metric: "sector".to_string(),
            equal_to: None,
            not_equal_to: Some(ScreenValue::Text("Tech".to_string())),
        };
        let result = Screener::screen_specs(&universe(), &[spec], &Selection::latest()).unwrap();
        assert_eq!(result.contracts.len(), 4);
        assert!(!result.contracts.contains("AAA"));
    }

    #[test]
    fn test_equality_requires_one_reference() {
        let both = FilterSpec::Equality {
            metric: "sector".to_string(),
            equal_to: Some(ScreenValue::Text("a".to_string())),
            not_equal_to: Some(ScreenValue::Text("b".to_string())),
        };
        assert!(matches!(both.build(), Err(RankingError::InvalidRule { .. })));
        let unknown = FilterSpec::Limit {
            metric: "bogus".to_string(),
            min: None,
            max: None,
        };
        assert!(matches!(unknown.build(), Err(RankingError::UnknownRule(_))));
    }

    #[test]
    fn test_sequential_report() {
        let specs: Vec<FilterSpec> = serde_json::from_str(
            r#"[
                {"kind": "limit", "metric": "price", "max": 18},
                {"kind": "equality", "metric": "sector", "equal_to": "Tech"}
            ]"#,
        )
        .unwrap();
        let result = Screener::screen_specs(&universe(), &specs, &Selection::latest()).unwrap();
        assert_eq!(result.initial(), 6);
        assert_eq!(result.contracts.tickers().collect::<Vec<_>>(), vec!["AAA", "BBB"]);
        let report = result.report();
        assert!(report.starts_with("Screening 6 contracts"));
        assert!(report.contains("price: discarded 2 (0 below, 1 above), 4 remaining"));
        assert!(report.ends_with("2 contracts remaining"));
    }
}
