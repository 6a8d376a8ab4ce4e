//! Canonical financial statement model.
//!
//! A [`Statement`] holds one array per declared line item, each parallel to the
//! statement's fiscal years (index 0 is the most recent year). The set of line
//! items is fixed per statement type by a [`LineItemField`] enum, so readers can
//! populate fields by chart-of-accounts code and callers can read them by name.

mod balance;
mod cashflow;
mod income;

pub use balance::{BalanceField, BalanceSheet};
pub use cashflow::{CashFlow, CashFlowField};
pub use income::{Income, IncomeField};

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Value of a field that has not been populated yet.
const NAN_SENTINEL: &[f64] = &[f64::NAN];

/// Chart-of-accounts type of a company.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
pub enum CoaType {
    /// Industrial companies.
    #[default]
    #[display("Industry")]
    Industry,
    /// Banks.
    #[display("Bank")]
    Bank,
    /// Insurance companies.
    #[display("Insurance")]
    Insurance,
    /// Utilities.
    #[display("Utility")]
    Utility,
}

impl CoaType {
    /// All chart-of-accounts types.
    pub const fn all() -> [Self; 4] {
        [Self::Industry, Self::Bank, Self::Insurance, Self::Utility]
    }

    /// Brokerage code of the type.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Industry => "IND",
            Self::Bank => "BNK",
            Self::Insurance => "INS",
            Self::Utility => "UTI",
        }
    }
}

impl FromStr for CoaType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::all()
            .into_iter()
            .find(|t| {
                t.code().eq_ignore_ascii_case(trimmed)
                    || t.to_string().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| DataError::InvalidCoaType(trimmed.to_string()))
    }
}

/// The three canonical statements.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Income statement.
    #[display("income")]
    Income,
    /// Balance sheet.
    #[display("balance")]
    Balance,
    /// Cash flow statement.
    #[display("cashflow")]
    CashFlow,
}

impl StatementKind {
    /// Statement type code used in brokerage exports.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Income => "INC",
            Self::Balance => "BAL",
            Self::CashFlow => "CAS",
        }
    }

    /// Look up a statement kind by brokerage code.
    pub fn from_code(code: &str) -> Option<Self> {
        [Self::Income, Self::Balance, Self::CashFlow]
            .into_iter()
            .find(|k| k.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// What a field setter does with NaN values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanPolicy {
    /// Store NaN as given.
    Keep,
    /// Replace NaN with zero.
    Zero,
}

impl NanPolicy {
    /// Apply the policy to a series of values.
    pub fn apply(self, values: Vec<f64>) -> Vec<f64> {
        match self {
            Self::Keep => values,
            Self::Zero => values
                .into_iter()
                .map(|v| if v.is_nan() { 0.0 } else { v })
                .collect(),
        }
    }
}

/// A declared line item of a statement type.
pub trait LineItemField: Copy + Ord + fmt::Debug + 'static {
    /// Statement kind the fields belong to.
    const KIND: StatementKind;

    /// Every declared field.
    const ALL: &'static [Self];

    /// Chart-of-accounts code.
    fn code(self) -> &'static str;

    /// Canonical name.
    fn name(self) -> &'static str;

    /// NaN policy of the field setter.
    fn nan_policy(self) -> NanPolicy {
        NanPolicy::Keep
    }

    /// Whether the field exists in the layout for the given type.
    fn applies_to(self, _coa_type: CoaType) -> bool {
        true
    }

    /// Look up a field by chart-of-accounts code.
    fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Look up a field by canonical name.
    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name.trim())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LineItem {
    values: Vec<f64>,
    populated: bool,
}

impl LineItem {
    fn unpopulated() -> Self {
        Self {
            values: NAN_SENTINEL.to_vec(),
            populated: false,
        }
    }
}

/// A financial statement over a sequence of fiscal years.
#[derive(Debug, Clone)]
pub struct Statement<F: LineItemField> {
    coa_type: CoaType,
    fiscal_years: Vec<i32>,
    fiscal_year_end_dates: Vec<NaiveDate>,
    items: BTreeMap<F, LineItem>,
}

impl<F: LineItemField> Default for Statement<F> {
    fn default() -> Self {
        Self::new(CoaType::default())
    }
}

impl<F: LineItemField> Statement<F> {
    /// Create an empty statement; every field holds the `[NaN]` sentinel.
    pub fn new(coa_type: CoaType) -> Self {
        let items = F::ALL
            .iter()
            .copied()
            .filter(|f| f.applies_to(coa_type))
            .map(|f| (f, LineItem::unpopulated()))
            .collect();
        Self {
            coa_type,
            fiscal_years: Vec::new(),
            fiscal_year_end_dates: Vec::new(),
            items,
        }
    }

    /// Chart-of-accounts type.
    pub const fn coa_type(&self) -> CoaType {
        self.coa_type
    }

    /// Switch the layout; fields that exist in both layouts keep their values.
    pub fn set_coa_type(&mut self, coa_type: CoaType) {
        let mut items = std::mem::take(&mut self.items);
        self.items = F::ALL
            .iter()
            .copied()
            .filter(|f| f.applies_to(coa_type))
            .map(|f| (f, items.remove(&f).unwrap_or_else(LineItem::unpopulated)))
            .collect();
        self.coa_type = coa_type;
    }

    /// Fiscal years, most recent first.
    pub fn fiscal_years(&self) -> &[i32] {
        &self.fiscal_years
    }

    /// Fiscal-year-end dates, parallel to [`Self::fiscal_years`].
    pub fn fiscal_year_end_dates(&self) -> &[NaiveDate] {
        &self.fiscal_year_end_dates
    }

    /// Number of fiscal periods.
    pub const fn len(&self) -> usize {
        self.fiscal_years.len()
    }

    /// Whether the statement has no fiscal periods.
    pub const fn is_empty(&self) -> bool {
        self.fiscal_years.is_empty()
    }

    /// Set the fiscal periods.
    pub fn set_periods(&mut self, fiscal_years: Vec<i32>, end_dates: Vec<NaiveDate>) -> Result<()> {
        if fiscal_years.len() != end_dates.len() {
            return Err(DataError::Parse(format!(
                "{} fiscal years but {} end dates",
                fiscal_years.len(),
                end_dates.len()
            )));
        }
        self.fiscal_years = fiscal_years;
        self.fiscal_year_end_dates = end_dates;
        Ok(())
    }

    /// Values of a field, or the `[NaN]` sentinel when it is unpopulated or
    /// absent from the current layout.
    pub fn field(&self, field: F) -> &[f64] {
        self.items
            .get(&field)
            .map_or(NAN_SENTINEL, |item| item.values.as_slice())
    }

    /// Whether a field has been populated by a reader or setter.
    pub fn is_populated(&self, field: F) -> bool {
        self.items.get(&field).is_some_and(|item| item.populated)
    }

    /// Populate a field, applying its NaN policy.
    pub fn set_field(&mut self, field: F, values: Vec<f64>) -> Result<()> {
        if !self.fiscal_years.is_empty() && values.len() != self.fiscal_years.len() {
            return Err(DataError::Parse(format!(
                "{} has {} values for {} fiscal years",
                field.name(),
                values.len(),
                self.fiscal_years.len()
            )));
        }
        let item = self
            .items
            .get_mut(&field)
            .ok_or_else(|| unknown_field::<F>(field.name()))?;
        item.values = field.nan_policy().apply(values);
        item.populated = true;
        Ok(())
    }

    /// Codes of the line items valid for the current layout.
    pub fn coa_items(&self) -> BTreeMap<&'static str, F> {
        self.items.keys().map(|f| (f.code(), *f)).collect()
    }

    /// Populate a field by chart-of-accounts code.
    pub fn set_coa_item(&mut self, code: &str, values: Vec<f64>) -> Result<()> {
        let field = F::from_code(code)
            .filter(|f| f.applies_to(self.coa_type))
            .ok_or_else(|| unknown_field::<F>(code))?;
        self.set_field(field, values)
    }

    /// Values of a field by chart-of-accounts code.
    pub fn coa_item(&self, code: &str) -> Option<&[f64]> {
        F::from_code(code)
            .filter(|f| self.items.contains_key(f))
            .map(|f| self.field(f))
    }

    /// Values of a field by canonical name.
    pub fn get_field(&self, name: &str) -> Result<&[f64]> {
        F::from_name(name)
            .filter(|f| self.items.contains_key(f))
            .map(|f| self.field(f))
            .ok_or_else(|| unknown_field::<F>(name))
    }
}

fn unknown_field<F: LineItemField>(field: &str) -> DataError {
    DataError::UnknownField {
        field: field.to_string(),
        statement: F::KIND.to_string(),
    }
}

/// Element-wise combination of two arrays. A length-1 operand is broadcast;
/// otherwise the shorter length wins.
pub(crate) fn zip_with(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    match (a.len(), b.len()) {
        (1, n) if n != 1 => b.iter().map(|&y| f(a[0], y)).collect(),
        (n, 1) if n != 1 => a.iter().map(|&x| f(x, b[0])).collect(),
        _ => a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect(),
    }
}

/// `numerator / denominator * 100`, element-wise.
pub(crate) fn percent(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    zip_with(numerator, denominator, |n, d| n / d * 100.0)
}
