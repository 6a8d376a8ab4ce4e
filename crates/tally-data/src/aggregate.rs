//! Stitching reconciled records into time series and merging them into
//! contracts.

use crate::contract::Contract;
use crate::error::{DataError, Result};
use crate::reader::ReconciledRecord;
use crate::statement::{LineItemField, Statement, StatementKind};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Per-field values over fiscal periods, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    fiscal_years: Vec<i32>,
    end_dates: Vec<NaiveDate>,
    values: BTreeMap<String, Vec<f64>>,
}

impl TimeSeries {
    /// Stitch records into a series ordered by descending fiscal year.
    ///
    /// When two records share a fiscal year the later one wins. A field
    /// missing from a record is NaN for that period.
    pub fn stitch(records: impl IntoIterator<Item = ReconciledRecord>) -> Self {
        let by_year: BTreeMap<i32, ReconciledRecord> =
            records.into_iter().map(|r| (r.fiscal_year, r)).collect();
        let names: BTreeSet<String> = by_year
            .values()
            .flat_map(|r| r.values.keys().cloned())
            .collect();

        let periods: Vec<&ReconciledRecord> = by_year.values().rev().collect();
        let values = names
            .into_iter()
            .map(|name| {
                let column = periods
                    .iter()
                    .map(|r| r.values.get(&name).copied().unwrap_or(f64::NAN))
                    .collect();
                (name, column)
            })
            .collect();

        Self {
            fiscal_years: periods.iter().map(|r| r.fiscal_year).collect(),
            end_dates: periods.iter().map(|r| r.fiscal_year_end).collect(),
            values,
        }
    }

    /// Fiscal years, most recent first.
    pub fn fiscal_years(&self) -> &[i32] {
        &self.fiscal_years
    }

    /// Period end dates, parallel to [`Self::fiscal_years`].
    pub fn end_dates(&self) -> &[NaiveDate] {
        &self.end_dates
    }

    /// Values of a field.
    pub fn field(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Field names.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of periods.
    pub fn len(&self) -> usize {
        self.fiscal_years.len()
    }

    /// Whether the series has no periods.
    pub fn is_empty(&self) -> bool {
        self.fiscal_years.is_empty()
    }
}

/// Several source periods fell into the calendar year of one reference
/// period; the chronologically first one was used.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("{ticker}: {statement} periods {candidates:?} all end in {calendar_year}, using {chosen}")]
pub struct StatementAlignmentWarning {
    /// Ticker of the contract.
    pub ticker: String,
    /// Statement being merged.
    pub statement: StatementKind,
    /// Calendar year of the reference period.
    pub calendar_year: i32,
    /// End dates of every candidate period.
    pub candidates: Vec<NaiveDate>,
    /// End date that was used.
    pub chosen: NaiveDate,
}

/// Merges time series into contracts by calendar year of the period end.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractAggregator;

impl ContractAggregator {
    /// Align a series to reference period end dates.
    ///
    /// Returns one value array per field, parallel to `reference`, plus any
    /// alignment warnings.
    pub fn align(
        ticker: &str,
        statement: StatementKind,
        reference: &[NaiveDate],
        series: &TimeSeries,
    ) -> (BTreeMap<String, Vec<f64>>, Vec<StatementAlignmentWarning>) {
        let mut warnings = Vec::new();
        let picks: Vec<Option<usize>> = reference
            .iter()
            .map(|date| {
                let mut candidates: Vec<(NaiveDate, usize)> = series
                    .end_dates
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| d.year() == date.year())
                    .map(|(i, d)| (*d, i))
                    .collect();
                candidates.sort();
                let &(chosen, index) = candidates.first()?;
                if candidates.len() > 1 {
                    let warning = StatementAlignmentWarning {
                        ticker: ticker.to_string(),
                        statement,
                        calendar_year: date.year(),
                        candidates: candidates.iter().map(|(d, _)| *d).collect(),
                        chosen,
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
                Some(index)
            })
            .collect();

        let aligned = series
            .values
            .iter()
            .map(|(name, values)| {
                let column = picks
                    .iter()
                    .map(|pick| pick.and_then(|i| values.get(i)).copied().unwrap_or(f64::NAN))
                    .collect();
                (name.clone(), column)
            })
            .collect();
        (aligned, warnings)
    }

    /// Merge a series into one statement of a contract.
    ///
    /// The contract's fiscal periods are the reference; a contract without
    /// periods takes the series' periods. Fields that do not exist in the
    /// contract's layout are skipped.
    ///
    /// # Errors
    ///
    /// [`DataError::UnknownField`] when the series holds a field the
    /// statement does not declare.
    pub fn merge(
        contract: &mut Contract,
        statement: StatementKind,
        series: &TimeSeries,
    ) -> Result<Vec<StatementAlignmentWarning>> {
        if contract.fiscal_years().is_empty() {
            contract.set_periods(series.fiscal_years.clone(), series.end_dates.clone())?;
        }
        let (aligned, warnings) = Self::align(
            contract.ticker(),
            statement,
            contract.fiscal_year_end_dates(),
            series,
        );
        match statement {
            StatementKind::Income => apply(contract.income_mut(), aligned)?,
            StatementKind::Balance => apply(contract.balance_mut(), aligned)?,
            StatementKind::CashFlow => apply(contract.cashflow_mut(), aligned)?,
        }
        Ok(warnings)
    }
}

fn apply<F: LineItemField>(
    statement: &mut Statement<F>,
    aligned: BTreeMap<String, Vec<f64>>,
) -> Result<()> {
    for (name, values) in aligned {
        let field = F::from_name(&name).ok_or_else(|| DataError::UnknownField {
            field: name.clone(),
            statement: F::KIND.to_string(),
        })?;
        if !field.applies_to(statement.coa_type()) {
            debug!(field = %name, coa_type = %statement.coa_type(), "field not in layout, skipped");
            continue;
        }
        statement.set_field(field, values)?;
    }
    Ok(())
}
