//! Ranking backtester.
//!
//! Re-ranks the universe at scheduled dates using only the fiscal periods
//! known at each date, and measures the forward price return of every ranked
//! contract over a fixed window.

use crate::error::RankingError;
use crate::ranking::{Ranking, RankingTable};
use chrono::{Duration, NaiveDate};
use derive_more::Display;
use ndarray::{Array1, Axis, Zip};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tally_data::{Contract, Contracts, PriceHistory, PriceProvider, Selection};
use tracing::{debug, info, warn};

/// Rebalancing frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Every day.
    #[display("daily")]
    Daily,
    /// Every 7 days.
    #[display("weekly")]
    Weekly,
    /// Every 30 days.
    #[display("monthly")]
    Monthly,
    /// Every 365 days.
    #[default]
    #[display("annual")]
    Annual,
}

impl Period {
    /// Length in days.
    pub const fn days(&self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Annual => 365,
        }
    }

    /// Dates `start, start + p, ..` up to and including `end`.
    pub fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let step = Duration::days(self.days());
        std::iter::successors(Some(start), |d| d.checked_add_signed(step))
            .take_while(|d| *d <= end)
            .collect()
    }
}

impl FromStr for Period {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Self::Daily),
            "weekly" | "w" => Ok(Self::Weekly),
            "monthly" | "m" => Ok(Self::Monthly),
            "annual" | "annually" | "yearly" | "y" => Ok(Self::Annual),
            other => Err(RankingError::InvalidRule {
                rule: "backtest period".to_string(),
                reason: format!("unknown period '{other}'"),
            }),
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Distance between ranking dates.
    pub frequency: Period,
    /// Forward return window in days.
    pub window_days: i64,
    /// Fiscal years to go back from the period known at each date.
    pub years_back: usize,
    /// Index tickers measured over the same windows.
    pub benchmarks: Vec<String>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            frequency: Period::Annual,
            window_days: 365,
            years_back: 0,
            benchmarks: vec!["SPX".to_string(), "SPXEW".to_string(), "MXWO".to_string()],
        }
    }
}

/// Forward return of a benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReturn {
    /// Index ticker.
    pub ticker: String,
    /// Forward return, NaN when unavailable.
    pub forward_return: f64,
}

/// Ranking and forward returns at one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Ranking date.
    pub date: NaiveDate,
    /// Tickers in ranking order.
    pub tickers: Vec<String>,
    /// Relative scores, parallel to `tickers`.
    pub weights: Vec<f64>,
    /// Forward returns, parallel to `tickers`.
    pub returns: Vec<f64>,
    /// Mean of the finite returns.
    pub equal_weighted: f64,
    /// Score-weighted mean of the finite returns.
    pub score_weighted: f64,
    /// Running equal-weighted mean down the ranking.
    pub equal_curve: Vec<f64>,
    /// Running score-weighted mean down the ranking.
    pub weighted_curve: Vec<f64>,
    /// Benchmark returns over the same window.
    pub benchmarks: Vec<BenchmarkReturn>,
}

impl Snapshot {
    fn new(date: NaiveDate, table: &RankingTable, returns: Vec<f64>) -> Self {
        let weights: Vec<f64> = table.rows().iter().map(|r| r.relative_score).collect();
        let (equal_curve, weighted_curve) = cumulative_curves(&returns, &weights);
        Self {
            date,
            tickers: table.rows().iter().map(|r| r.ticker.clone()).collect(),
            equal_weighted: equal_curve.last().copied().unwrap_or(f64::NAN),
            score_weighted: weighted_curve.last().copied().unwrap_or(f64::NAN),
            weights,
            returns,
            equal_curve,
            weighted_curve,
            benchmarks: Vec::new(),
        }
    }

    /// Forward return of a benchmark.
    pub fn benchmark(&self, ticker: &str) -> Option<f64> {
        self.benchmarks
            .iter()
            .find(|b| b.ticker == ticker)
            .map(|b| b.forward_return)
    }
}

/// Running means of the finite returns: equal-weighted and weighted.
///
/// Entry `i` covers the first `i + 1` returns; it is NaN until a finite
/// return (with positive total weight, for the weighted curve) is seen.
/// Returns without a weight weigh zero.
pub(crate) fn cumulative_curves(returns: &[f64], weights: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let returns = Array1::from_iter(returns.iter().copied());
    let weights = Array1::from_iter(weights.iter().copied().chain(std::iter::repeat(0.0)).take(returns.len()));
    let valid = returns.mapv(|r| if r.is_finite() { 1.0 } else { 0.0 });
    let clean = returns.mapv(|r| if r.is_finite() { r } else { 0.0 });

    let mut sums = clean.clone();
    let mut counts = valid.clone();
    let mut weighted = &clean * &weights;
    let mut weight_sums = &valid * &weights;
    for array in [&mut sums, &mut counts, &mut weighted, &mut weight_sums] {
        array.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
    }

    let ratio = |num: &Array1<f64>, den: &Array1<f64>| -> Vec<f64> {
        Zip::from(num)
            .and(den)
            .map_collect(|&n, &d| if d > 0.0 { n / d } else { f64::NAN })
            .to_vec()
    };
    (ratio(&sums, &counts), ratio(&weighted, &weight_sums))
}

/// Outcome of a backtest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Settings used.
    pub config: BacktestConfig,
    /// One snapshot per scheduled date.
    pub snapshots: Vec<Snapshot>,
}

impl BacktestReport {
    /// Mean over snapshots of the equal-weighted return, ignoring NaN.
    pub fn mean_equal_weighted(&self) -> f64 {
        finite_mean(self.snapshots.iter().map(|s| s.equal_weighted))
    }

    /// Mean over snapshots of the score-weighted return, ignoring NaN.
    pub fn mean_score_weighted(&self) -> f64 {
        finite_mean(self.snapshots.iter().map(|s| s.score_weighted))
    }

    /// Mean over snapshots of a benchmark return, ignoring NaN.
    pub fn mean_benchmark(&self, ticker: &str) -> f64 {
        finite_mean(self.snapshots.iter().filter_map(|s| s.benchmark(ticker)))
    }
}

fn finite_mean(values: impl Iterator<Item = f64>) -> f64 {
    let finite = Array1::from_iter(values.filter(|v| v.is_finite()));
    finite.mean().unwrap_or(f64::NAN)
}

/// Forward return `close(date + window) / close(date) - 1`, NaN when the
/// history does not cover the window.
pub fn forward_return(history: &PriceHistory, date: NaiveDate, window_days: i64) -> f64 {
    let Some(exit) = date.checked_add_signed(Duration::days(window_days)) else {
        return f64::NAN;
    };
    if history.last_date().is_none_or(|last| last < exit) {
        return f64::NAN;
    }
    match (history.close_on_or_before(date), history.close_on_or_before(exit)) {
        (Ok(Some(entry)), Ok(Some(close))) => close / entry - 1.0,
        _ => f64::NAN,
    }
}

/// Replays a ranking over a schedule.
#[derive(Debug, Clone, Default)]
pub struct BackTester {
    config: BacktestConfig,
}

impl BackTester {
    /// Create a backtester.
    pub const fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Settings.
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Rank at every scheduled date between `start` and `end` and measure
    /// forward returns. Contracts without a price history take the
    /// provider's; provider failures yield NaN returns.
    pub fn run(
        &self,
        ranking: &Ranking,
        contracts: &Contracts,
        start: NaiveDate,
        end: NaiveDate,
        prices: &dyn PriceProvider,
    ) -> BacktestReport {
        let contracts: Contracts = contracts.iter().map(|c| with_prices(c, prices)).collect();
        let benchmarks: Vec<(String, Option<PriceHistory>)> = self
            .config
            .benchmarks
            .iter()
            .map(|ticker| (ticker.clone(), load(prices, ticker)))
            .collect();

        let dates = self.config.frequency.schedule(start, end);
        info!(dates = dates.len(), contracts = contracts.len(), frequency = %self.config.frequency, "backtesting");

        let snapshots = dates
            .into_iter()
            .map(|date| {
                let at = Selection::at(date).with_years_back(self.config.years_back);
                let table = ranking.rank(&contracts, &at);
                let returns = table
                    .rows()
                    .iter()
                    .map(|row| {
                        contracts
                            .get(&row.ticker)
                            .and_then(Contract::pricing)
                            .map_or(f64::NAN, |h| forward_return(h, date, self.config.window_days))
                    })
                    .collect();
                let mut snapshot = Snapshot::new(date, &table, returns);
                snapshot.benchmarks = benchmarks
                    .iter()
                    .map(|(ticker, history)| BenchmarkReturn {
                        ticker: ticker.clone(),
                        forward_return: history
                            .as_ref()
                            .map_or(f64::NAN, |h| forward_return(h, date, self.config.window_days)),
                    })
                    .collect();
                debug!(%date, equal = snapshot.equal_weighted, weighted = snapshot.score_weighted, "snapshot");
                snapshot
            })
            .collect();

        BacktestReport {
            config: self.config.clone(),
            snapshots,
        }
    }
}

fn load(prices: &dyn PriceProvider, ticker: &str) -> Option<PriceHistory> {
    match prices.price_history(ticker) {
        Ok(Some(history)) => Some(history),
        Ok(None) => {
            warn!(ticker, "no price history");
            None
        }
        Err(e) => {
            warn!(ticker, error = %e, "price history unavailable");
            None
        }
    }
}

fn with_prices(contract: &Contract, prices: &dyn PriceProvider) -> Contract {
    let mut contract = contract.clone();
    if contract.pricing().is_none() {
        let history = load(prices, contract.ticker());
        contract.set_pricing(history);
    }
    contract
}
