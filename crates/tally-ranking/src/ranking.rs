//! Ranking of contracts by a list of rules.

use crate::error::{RankingError, Result};
use crate::result::{RankingFlag, RankingResult};
use crate::rule::RankingObject;
use serde::Serialize;
use std::cmp::Ordering;
use tally_data::{Contract, Contracts, Selection};
use tracing::{debug, info};

/// Ordered list of rules applied to every contract.
#[derive(Debug, Default)]
pub struct Ranking {
    rules: Vec<Box<dyn RankingObject>>,
}

impl Ranking {
    /// Create a ranking from rules.
    pub const fn new(rules: Vec<Box<dyn RankingObject>>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Box<dyn RankingObject>) {
        self.rules.push(rule);
    }

    /// The rules, in column order.
    pub fn rules(&self) -> &[Box<dyn RankingObject>] {
        &self.rules
    }

    /// Rule descriptions, in column order.
    pub fn descriptions(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.description().to_string()).collect()
    }

    /// Column index of a rule.
    ///
    /// # Errors
    ///
    /// [`RankingError::UnknownRule`] when no rule has this description.
    pub fn find_index(&self, description: &str) -> Result<usize> {
        self.rules
            .iter()
            .position(|r| r.description() == description)
            .ok_or_else(|| RankingError::UnknownRule(description.to_string()))
    }

    /// Evaluate every rule on one contract.
    pub fn rank_contract(&self, contract: &Contract, at: &Selection) -> RankingRow {
        let results: Vec<RankingResult> = self.rules.iter().map(|r| r.rank(contract, at)).collect();
        RankingRow::new(contract, results)
    }

    /// Rank contracts: relative score descending, then sector, then name.
    pub fn rank(&self, contracts: &Contracts, at: &Selection) -> RankingTable {
        info!(contracts = contracts.len(), rules = self.rules.len(), "ranking");
        let mut rows: Vec<RankingRow> = contracts
            .iter()
            .map(|c| self.rank_contract(c, at))
            .collect();
        rows.sort_by(RankingRow::ranking_order);
        if let Some(top) = rows.first() {
            debug!(ticker = %top.ticker, score = top.relative_score, "top ranked");
        }
        RankingTable {
            descriptions: self.descriptions(),
            cutoffs: self.rules.iter().map(|r| r.cutoffs().to_vec()).collect(),
            rows,
            selection: *at,
        }
    }
}

/// Results of every rule on one contract plus the aggregated scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// Ticker.
    pub ticker: String,
    /// Company name.
    pub name: String,
    /// Sector.
    pub sector: String,
    /// One result per rule, in column order.
    pub results: Vec<RankingResult>,
    /// Mean normalized score over the counted rules, in `[0, 1]`.
    pub relative_score: f64,
    /// Sum of normalized scores of OK results.
    pub score_sum: f64,
    /// Number of OK results with a positive maximum score.
    pub counted: usize,
    /// Number of NODATA results.
    pub no_data: usize,
    /// Number of CONSTRAINT results.
    pub constraints: usize,
}

impl RankingRow {
    /// Aggregate the results of one contract.
    pub fn new(contract: &Contract, results: Vec<RankingResult>) -> Self {
        let counted = results.iter().filter(|r| r.counts()).count();
        let score_sum: f64 = results.iter().filter(|r| r.counts()).map(RankingResult::score).sum();
        let tally = |flag: RankingFlag| results.iter().filter(|r| r.flag() == flag).count();
        let relative_score = if counted == 0 {
            0.0
        } else {
            score_sum / counted as f64
        };
        Self {
            ticker: contract.ticker().to_string(),
            name: contract.long_name().to_string(),
            sector: contract.sector().to_string(),
            no_data: tally(RankingFlag::NoData),
            constraints: tally(RankingFlag::Constraint),
            results,
            relative_score,
            score_sum,
            counted,
        }
    }

    /// Score sum over counted rules, as `"sum/count"`.
    pub fn absolute_score(&self) -> String {
        format!("{}/{}", format_number(self.score_sum), self.counted)
    }

    /// NODATA, CONSTRAINT and total rule counts, as `"nodata/constraints/total"`.
    pub fn tallies(&self) -> String {
        format!("{}/{}/{}", self.no_data, self.constraints, self.results.len())
    }

    /// Relative score in percent, rounded to two decimals.
    pub fn relative_score_percent(&self) -> String {
        format!("{:.2}", self.relative_score * 100.0)
    }

    fn ranking_order(a: &Self, b: &Self) -> Ordering {
        b.relative_score
            .total_cmp(&a.relative_score)
            .then_with(|| a.sector.cmp(&b.sector))
            .then_with(|| a.name.cmp(&b.name))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let rounded = format!("{value:.2}");
        rounded.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Ranked rows with their rule columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTable {
    descriptions: Vec<String>,
    cutoffs: Vec<Vec<f64>>,
    rows: Vec<RankingRow>,
    selection: Selection,
}

impl RankingTable {
    /// Rule descriptions, in column order.
    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    /// Rows in ranking order.
    pub fn rows(&self) -> &[RankingRow] {
        &self.rows
    }

    /// Row of a ticker.
    pub fn row(&self, ticker: &str) -> Option<&RankingRow> {
        self.rows.iter().find(|r| r.ticker == ticker)
    }

    /// Tickers in ranking order.
    pub fn tickers(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.ticker.as_str()).collect()
    }

    /// Selection the table was ranked at.
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value distribution and flag counts of one rule column.
    ///
    /// # Errors
    ///
    /// [`RankingError::UnknownRule`] when no column has this description.
    pub fn rule_stats(&self, description: &str) -> Result<RuleStats> {
        let index = self
            .descriptions
            .iter()
            .position(|d| d == description)
            .ok_or_else(|| RankingError::UnknownRule(description.to_string()))?;
        let column: Vec<&RankingResult> = self.rows.iter().map(|r| &r.results[index]).collect();
        let count = |flag: RankingFlag| column.iter().filter(|r| r.flag() == flag).count();
        Ok(RuleStats {
            description: description.to_string(),
            cutoffs: self.cutoffs[index].clone(),
            values: column
                .iter()
                .filter(|r| r.flag() == RankingFlag::Ok)
                .map(|r| r.value())
                .collect(),
            no_data: count(RankingFlag::NoData),
            constraints: count(RankingFlag::Constraint),
            total: column.len(),
        })
    }
}

/// Distribution of one rule over a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleStats {
    /// Rule description.
    pub description: String,
    /// Rule cutoffs.
    pub cutoffs: Vec<f64>,
    /// Values of OK results, in ranking order.
    pub values: Vec<f64>,
    /// Number of NODATA results.
    pub no_data: usize,
    /// Number of CONSTRAINT results.
    pub constraints: usize,
    /// Number of contracts.
    pub total: usize,
}

impl RuleStats {
    /// Number of OK values in each cutoff interval, one more bucket than cutoffs.
    pub fn histogram(&self) -> Vec<usize> {
        let mut buckets = vec![0; self.cutoffs.len() + 1];
        for value in &self.values {
            buckets[self.cutoffs.partition_point(|c| c <= value)] += 1;
        }
        buckets
    }
}
