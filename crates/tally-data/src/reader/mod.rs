//! Statement reader and reconciler for tabular financial reports.
//!
//! A [`RawReport`] is the sheet-by-sheet content of one filing (for example an
//! SEC `Financial_Report` spreadsheet converted to JSON). The
//! [`StatementReader`] picks the statement sheet, the annual reporting column
//! and one row per canonical field, and returns the values in millions as a
//! [`ReconciledRecord`].

mod columns;
mod units;

pub use units::Unit;

use crate::error::{DataError, Result};
use crate::resolution::{LabelResolver, ResolutionConfig, ResolutionTable, normalize};
use crate::statement::StatementKind;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Relative tolerance of the duplicate-row heuristic.
const SPLIT_TOLERANCE: f64 = 1e-6;

/// One labelled row of a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Row label as printed in the report.
    pub label: String,
    /// Cell values, parallel to the sheet's columns; `None` for blank cells.
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

impl RawRow {
    /// Create a row.
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Finite value in a column.
    pub fn value(&self, column: usize) -> Option<f64> {
        self.values
            .get(column)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    /// Whether any cell holds a finite value.
    pub fn has_data(&self) -> bool {
        self.values.iter().flatten().any(|v| v.is_finite())
    }
}

/// One sheet of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSheet {
    /// Sheet name (spreadsheets truncate it to 31 characters).
    pub name: String,
    /// Header text above the table, e.g. `"... - USD ($) $ in Millions"`.
    #[serde(default)]
    pub caption: String,
    /// Headers of the value columns.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Table rows.
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

/// Annual column a sheet reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingColumn {
    /// Index into the row values.
    pub index: usize,
    /// Period end date.
    pub date: NaiveDate,
}

impl RawSheet {
    /// Whether any row holds numeric data.
    pub fn has_data(&self) -> bool {
        self.rows.iter().any(RawRow::has_data)
    }

    /// Unit detected from the caption or, failing that, the sheet name.
    pub fn unit(&self) -> Unit {
        match Unit::detect(&self.caption) {
            Unit::Units => Unit::detect(&self.name),
            unit => unit,
        }
    }

    /// The first dated, non-interim column.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Parse`] when no column qualifies.
    pub fn reporting_column(&self) -> Result<ReportingColumn> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, header)| !columns::is_interim(header))
            .find_map(|(index, header)| {
                columns::header_date(header).map(|date| ReportingColumn { index, date })
            })
            .ok_or_else(|| {
                DataError::Parse(format!("no annual date column in sheet '{}'", self.name))
            })
    }
}

/// The content of one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    /// Ticker the filing belongs to.
    pub ticker: String,
    /// Source identifier, e.g. the accession number or file name.
    #[serde(default)]
    pub source: String,
    /// Sheets in document order.
    #[serde(default)]
    pub sheets: Vec<RawSheet>,
}

impl RawReport {
    /// Parse a report from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a report from a JSON file; the file name becomes the source when
    /// the document does not name one.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut report = Self::from_json(&std::fs::read_to_string(path)?)?;
        if report.source.is_empty() {
            report.source = path.display().to_string();
        }
        Ok(report)
    }

    /// Sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Values of one statement for one fiscal period, in millions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    /// Fiscal year (calendar year of the period end).
    pub fiscal_year: i32,
    /// Period end date.
    pub fiscal_year_end: NaiveDate,
    /// Canonical field name to value.
    pub values: BTreeMap<String, f64>,
    /// Document the record was read from.
    pub source: String,
}

impl ReconciledRecord {
    /// Create an empty record for a period.
    pub fn new(fiscal_year_end: NaiveDate, source: impl Into<String>) -> Self {
        Self {
            fiscal_year: fiscal_year_end.year(),
            fiscal_year_end,
            values: BTreeMap::new(),
            source: source.into(),
        }
    }

    /// Builder-style value insertion.
    pub fn with_value(mut self, field: impl Into<String>, value: f64) -> Self {
        self.values.insert(field.into(), value);
        self
    }
}

/// Reads canonical fields out of [`RawReport`]s.
#[derive(Debug, Clone, Copy)]
pub struct StatementReader<'a> {
    config: &'a ResolutionConfig,
}

impl<'a> StatementReader<'a> {
    /// Create a reader backed by a resolution configuration.
    pub const fn new(config: &'a ResolutionConfig) -> Self {
        Self { config }
    }

    /// Pick the sheet holding a statement.
    ///
    /// # Errors
    ///
    /// Resolution errors from the statement's sheet table, or
    /// [`DataError::LabelNotFound`] when no sheet table is configured.
    pub fn select_sheet<'r>(&self, report: &'r RawReport, kind: StatementKind) -> Result<&'r RawSheet> {
        let field = format!("{kind} sheet");
        let table = self
            .config
            .sheet_table(kind)
            .ok_or_else(|| DataError::LabelNotFound {
                field: field.clone(),
                ticker: Some(report.ticker.clone()),
            })?;
        let name = LabelResolver::new(&field, table).resolve(
            Some(report.ticker.as_str()),
            report.sheets.iter().map(|s| (s.name.as_str(), s.has_data())),
        )?;
        report
            .sheet(name)
            .ok_or_else(|| DataError::Parse(format!("sheet '{name}' vanished")))
    }

    /// Read one field from a sheet, in millions.
    ///
    /// # Errors
    ///
    /// [`DataError::LabelNotFound`], [`DataError::AmbiguousLabel`] or
    /// [`DataError::AmbiguousValue`], or a parse error when the sheet has no
    /// annual column.
    pub fn read_field(
        &self,
        ticker: Option<&str>,
        sheet: &RawSheet,
        field: &str,
        table: &ResolutionTable,
    ) -> Result<f64> {
        let column = sheet.reporting_column()?;
        let label = LabelResolver::new(field, table).resolve(
            ticker,
            sheet
                .rows
                .iter()
                .map(|r| (r.label.as_str(), r.value(column.index).is_some())),
        )?;
        let wanted = normalize(label);
        let values: Vec<f64> = sheet
            .rows
            .iter()
            .filter(|r| normalize(&r.label) == wanted)
            .filter_map(|r| r.value(column.index))
            .collect();
        let value = resolve_rows(field, label, &values)?;
        debug!(field, label, value, "read field");
        Ok(value * sheet.unit().to_millions())
    }

    /// Read every configured field of a statement. The first failing field
    /// fails the whole document.
    ///
    /// # Errors
    ///
    /// Any error of [`Self::select_sheet`] or [`Self::read_field`].
    pub fn read_statement(&self, report: &RawReport, kind: StatementKind) -> Result<ReconciledRecord> {
        let sheet = self.select_sheet(report, kind)?;
        let column = sheet.reporting_column()?;
        let mut record = ReconciledRecord::new(column.date, &report.source);
        for (field, table) in self.config.field_tables(kind) {
            let value = self.read_field(Some(report.ticker.as_str()), sheet, field, table)?;
            record.values.insert(field.to_string(), value);
        }
        Ok(record)
    }
}

/// Collapse the values of repeated rows into one.
///
/// Equal values collapse trivially. Two rows whose sum is twice the larger
/// value within `SPLIT_TOLERANCE` differ only by rounding, and the larger row
/// is taken. Anything else is ambiguous.
fn resolve_rows(field: &str, label: &str, values: &[f64]) -> Result<f64> {
    let ambiguous = || DataError::AmbiguousValue {
        field: field.to_string(),
        label: label.to_string(),
        values: values.to_vec(),
    };
    let first = *values.first().ok_or_else(ambiguous)?;
    if values.iter().all(|v| *v == first) {
        return Ok(first);
    }
    if values.len() != 2 {
        return Err(ambiguous());
    }
    let largest = values[0].max(values[1]);
    let ratio = (values[0] + values[1]) / largest;
    if largest != 0.0 && (ratio - 2.0).abs() <= SPLIT_TOLERANCE * 2.0 {
        Ok(largest)
    } else {
        Err(ambiguous())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sheet(caption: &str, rows: Vec<RawRow>) -> RawSheet {
        RawSheet {
            name: "Consolidated Statements of Oper".to_string(),
            caption: caption.to_string(),
            columns: vec![
                "3 Months Ended Dec. 31, 2023".to_string(),
                "12 Months Ended Dec. 31, 2023".to_string(),
                "12 Months Ended Dec. 31, 2022".to_string(),
            ],
            rows,
        }
    }

    #[test]
    fn test_reporting_column_skips_interim() {
        let sheet = sheet("", vec![]);
        let column = sheet.reporting_column().unwrap();
        assert_eq!(column.index, 1);
        assert_eq!(column.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_reporting_column_missing() {
        let mut sheet = sheet("", vec![]);
        sheet.columns = vec!["3 Months Ended Dec. 31, 2023".to_string()];
        assert!(matches!(sheet.reporting_column(), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_resolve_rows() {
        assert_eq!(resolve_rows("f", "l", &[5.0]).unwrap(), 5.0);
        assert_eq!(resolve_rows("f", "l", &[5.0, 5.0, 5.0]).unwrap(), 5.0);
        assert_eq!(resolve_rows("f", "l", &[0.0, 0.0]).unwrap(), 0.0);
        assert_eq!(resolve_rows("f", "l", &[100.0, 100.00005]).unwrap(), 100.00005);
        assert!(resolve_rows("f", "l", &[100.0, 100.01]).is_err());
        assert!(resolve_rows("f", "l", &[200.0, 100.0]).is_err());
        assert!(resolve_rows("f", "l", &[300.0, 100.0, 200.0]).is_err());
        assert!(resolve_rows("f", "l", &[]).is_err());
    }

    #[test]
    fn test_read_field_scales_thousands() {
        let table = ResolutionTable::new(["net sales"], Vec::<Vec<&str>>::new());
        let config = ResolutionConfig::empty();
        let reader = StatementReader::new(&config);
        let sheet = sheet(
            "CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($) $ in Thousands",
            vec![RawRow::new("Net sales", vec![Some(1.0), Some(2_500_000.0), Some(2_000_000.0)])],
        );
        let value = reader.read_field(None, &sheet, "revenue", &table).unwrap();
        assert_relative_eq!(value, 2_500.0);
    }

    #[test]
    fn test_repeated_rows_match_unicode_case() {
        let table = ResolutionTable::new(["umsatzerlöse"], Vec::<Vec<&str>>::new());
        let config = ResolutionConfig::empty();
        let reader = StatementReader::new(&config);
        let sheet = sheet(
            "$ in Millions",
            vec![
                RawRow::new("UMSATZERLÖSE", vec![None, Some(100.0), None]),
                RawRow::new("Umsatzerlöse", vec![None, Some(40.0), None]),
            ],
        );
        match reader.read_field(None, &sheet, "revenue", &table) {
            Err(DataError::AmbiguousValue { values, .. }) => assert_eq!(values, vec![100.0, 40.0]),
            other => panic!("expected ambiguous value, got {other:?}"),
        }
    }

    #[test]
    fn test_row_without_value_in_reporting_column_is_no_candidate() {
        let table = ResolutionTable::new(["net sales", "revenues"], Vec::<Vec<&str>>::new());
        let config = ResolutionConfig::empty();
        let reader = StatementReader::new(&config);
        let sheet = sheet(
            "$ in Millions",
            vec![
                RawRow::new("Revenues", vec![Some(10.0), None, Some(30.0)]),
                RawRow::new("Net sales", vec![None, Some(40.0), Some(35.0)]),
            ],
        );
        assert_relative_eq!(
            reader.read_field(None, &sheet, "revenue", &table).unwrap(),
            40.0
        );
    }
}
