//! Export functionality for tally results.
//!
//! This module provides CSV and JSON export of ranking tables and backtest
//! reports. Missing values are written as empty CSV cells and as JSON `null`.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tally_ranking::{BacktestReport, RankingTable};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::PrettyJson),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty" | "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Numeric CSV cell; NaN is empty.
pub fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

pub(crate) fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Header of the ranking CSV.
pub fn ranking_header(table: &RankingTable) -> Vec<String> {
    let mut header: Vec<String> = [
        "Ticker",
        "Name",
        "Sector",
        "Relative Score",
        "Absolute Score",
        "No Data/Constraints/Tot.",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    for description in table.descriptions() {
        header.push(description.clone());
        header.push(format!("{description} Score"));
    }
    header
}

impl Exporter for RankingTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(ranking_header(self))?;
                for row in self.rows() {
                    let mut record = vec![
                        row.ticker.clone(),
                        row.name.clone(),
                        row.sector.clone(),
                        format!("{}%", row.relative_score_percent()),
                        row.absolute_score(),
                        row.tallies(),
                    ];
                    for result in &row.results {
                        record.push(format_cell(result.value()));
                        record.push(format_cell(result.score()));
                    }
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for BacktestReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let mut header = vec![
                    "Date".to_string(),
                    "Contracts".to_string(),
                    "Equal Weighted".to_string(),
                    "Score Weighted".to_string(),
                ];
                header.extend(self.config.benchmarks.iter().cloned());
                wtr.write_record(&header)?;

                for snapshot in &self.snapshots {
                    let mut record = vec![
                        snapshot.date.to_string(),
                        snapshot.tickers.len().to_string(),
                        format_cell(snapshot.equal_weighted),
                        format_cell(snapshot.score_weighted),
                    ];
                    record.extend(
                        self.config
                            .benchmarks
                            .iter()
                            .map(|b| format_cell(snapshot.benchmark(b).unwrap_or(f64::NAN))),
                    );
                    wtr.write_record(&record)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
