//! Ranking and backtest summaries.
//!
//! This module turns ranking tables and backtest reports into terminal
//! tables and Markdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tally_ranking::{BacktestReport, RankingTable};

/// One line of a ranking summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContract {
    /// Position in the ranking, starting at 1.
    pub position: usize,
    /// Ticker.
    pub ticker: String,
    /// Company name.
    pub name: String,
    /// Sector.
    pub sector: String,
    /// Relative score in `[0, 1]`.
    pub relative_score: f64,
    /// Absolute score, `"sum/count"`.
    pub absolute_score: String,
    /// NODATA, CONSTRAINT and rule counts.
    pub tallies: String,
}

/// Top of a ranking with the rules it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSummary {
    /// Rule descriptions.
    pub rules: Vec<String>,
    /// Number of ranked contracts.
    pub total: usize,
    /// Ranked contracts, best first.
    pub contracts: Vec<RankedContract>,
}

impl RankingSummary {
    /// Summarize the first `limit` rows of a table, every row without a limit.
    pub fn new(table: &RankingTable, limit: Option<usize>) -> Self {
        let contracts = table
            .rows()
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(i, row)| RankedContract {
                position: i + 1,
                ticker: row.ticker.clone(),
                name: row.name.clone(),
                sector: row.sector.clone(),
                relative_score: row.relative_score,
                absolute_score: row.absolute_score(),
                tallies: row.tallies(),
            })
            .collect();
        Self {
            rules: table.descriptions().to_vec(),
            total: table.len(),
            contracts,
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nRanking: {} contracts, {} rules\n",
            self.total,
            self.rules.len()
        ));
        output.push_str(&format!("Rules: {}\n", self.rules.join(", ")));
        output.push_str(&"=".repeat(96));
        output.push('\n');

        output.push_str(&format!(
            "{:>4} {:<8} {:<28} {:<22} {:>9} {:>9} {:>10}\n",
            "#", "Ticker", "Name", "Sector", "Relative", "Absolute", "ND/C/Tot"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for c in &self.contracts {
            output.push_str(&format!(
                "{:>4} {:<8} {:<28} {:<22} {:>8.2}% {:>9} {:>10}\n",
                c.position,
                c.ticker,
                truncate(&c.name, 28),
                truncate(&c.sector, 22),
                c.relative_score * 100.0,
                c.absolute_score,
                c.tallies
            ));
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Ranking\n\n");
        output.push_str(&format!("**Contracts:** {}\n\n", self.total));
        output.push_str(&format!("**Rules:** {}\n\n", self.rules.join(", ")));
        output.push_str("| # | Ticker | Name | Sector | Relative Score | Absolute Score | No Data/Constraints/Tot. |\n");
        output.push_str("|---|--------|------|--------|----------------|----------------|--------------------------|\n");
        for c in &self.contracts {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {:.2}% | {} | {} |\n",
                c.position,
                c.ticker,
                c.name,
                c.sector,
                c.relative_score * 100.0,
                c.absolute_score,
                c.tallies
            ));
        }
        output
    }
}

impl fmt::Display for RankingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ranking of {} contracts by {} rules", self.total, self.rules.len())?;
        for c in &self.contracts {
            writeln!(
                f,
                "  {}. {} ({}): {:.2}%",
                c.position,
                c.ticker,
                c.name,
                c.relative_score * 100.0
            )?;
        }
        Ok(())
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('~');
        short
    }
}

/// Mean returns of a backtest against its benchmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Number of ranking dates.
    pub snapshots: usize,
    /// Window of the forward returns in days.
    pub window_days: i64,
    /// Mean equal-weighted return.
    pub equal_weighted: f64,
    /// Mean score-weighted return.
    pub score_weighted: f64,
    /// Mean return per benchmark.
    pub benchmarks: Vec<(String, f64)>,
}

impl BacktestSummary {
    /// Summarize a report.
    pub fn new(report: &BacktestReport) -> Self {
        Self {
            snapshots: report.snapshots.len(),
            window_days: report.config.window_days,
            equal_weighted: report.mean_equal_weighted(),
            score_weighted: report.mean_score_weighted(),
            benchmarks: report
                .config
                .benchmarks
                .iter()
                .map(|b| (b.clone(), report.mean_benchmark(b)))
                .collect(),
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "\nBacktest: {} dates, {}-day forward returns\n",
            self.snapshots, self.window_days
        ));
        output.push_str(&"=".repeat(40));
        output.push('\n');
        output.push_str(&format!("{:<24} {:>14}\n", "Portfolio", "Mean Return"));
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("{:<24} {:>14}\n", "Equal Weighted", percent(self.equal_weighted)));
        output.push_str(&format!("{:<24} {:>14}\n", "Score Weighted", percent(self.score_weighted)));
        for (ticker, value) in &self.benchmarks {
            output.push_str(&format!("{:<24} {:>14}\n", ticker, percent(*value)));
        }
        output.push_str(&"=".repeat(40));
        output.push('\n');
        output
    }
}

fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}
