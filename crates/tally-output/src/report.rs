//! Report generation for tally runs.

use crate::export::{ExportError, ExportFormat, Exporter};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A report of one ranking, screening or backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// What the run was.
    pub title: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Evaluation date, `None` for the latest fiscal period.
    pub as_of: Option<NaiveDate>,

    /// Fiscal periods stepped back from the evaluation date.
    pub years_back: usize,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report.
    pub fn new(
        title: String,
        as_of: Option<NaiveDate>,
        years_back: usize,
        contents: serde_json::Value,
    ) -> Self {
        Self {
            title,
            timestamp: Utc::now(),
            as_of,
            years_back,
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Exporter for Report {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => Err(ExportError::InvalidFormat(
                "reports can only be exported as JSON".to_string(),
            )),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    title: Option<String>,
    as_of: Option<NaiveDate>,
    years_back: usize,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the evaluation date.
    pub const fn as_of(mut self, date: Option<NaiveDate>) -> Self {
        self.as_of = date;
        self
    }

    /// Set the number of fiscal periods stepped back.
    pub const fn years_back(mut self, years: usize) -> Self {
        self.years_back = years;
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Set the report contents from any serializable value.
    pub fn contents_from<T: Serialize>(mut self, value: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.title.unwrap_or_default(),
            self.as_of,
            self.years_back,
            self.contents.unwrap_or(serde_json::Value::Null),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("ranking".to_string(), None, 0, serde_json::json!({"test": "data"}));

        assert_eq!(report.title, "ranking");
        assert_eq!(report.years_back, 0);
        assert!(report.to_json().unwrap().contains("\"test\": \"data\""));
    }

    #[test]
    fn test_report_builder() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
        let report = ReportBuilder::new()
            .title("screen")
            .as_of(Some(date))
            .years_back(2)
            .contents_from(&vec!["AAA", "BBB"])
            .unwrap()
            .build();

        assert_eq!(report.title, "screen");
        assert_eq!(report.as_of, Some(date));
        assert_eq!(report.years_back, 2);
        assert_eq!(report.contents, serde_json::json!(["AAA", "BBB"]));
    }

    #[test]
    fn test_report_rejects_csv() {
        let report = ReportBuilder::new().build();
        assert!(report.contents.is_null());
        assert!(matches!(
            report.export_to_string(ExportFormat::Csv),
            Err(ExportError::InvalidFormat(_))
        ));
        assert!(report.export_to_string(ExportFormat::Json).is_ok());
    }
}
