//! Per-company contracts.
//!
//! A [`Contract`] owns the three statements of one ticker together with its
//! descriptive data and optional price history, and derives cross-statement
//! metrics on read. Metrics propagate NaN; only the price-based metrics fail
//! explicitly, with a [`MetricError`], when no price is available.

mod contracts;
pub mod growth;

pub use contracts::Contracts;

use crate::error::{DataError, Result};
use crate::pricing::PriceHistory;
use crate::statement::{
    BalanceField, BalanceSheet, CashFlow, CoaType, Income, LineItemField, Statement, percent,
    zip_with,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a metric that needs data beyond the statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    /// No price for the requested date.
    #[error("No price available for {ticker}{}", date_suffix(.date))]
    NoPrice {
        /// Ticker of the contract
        ticker: String,
        /// Requested date, `None` for the current price
        date: Option<NaiveDate>,
    },

    /// Reading the price history failed.
    #[error("Price history of {ticker} is unreadable: {reason}")]
    Pricing {
        /// Ticker of the contract
        ticker: String,
        /// Underlying failure
        reason: String,
    },
}

fn date_suffix(date: &Option<NaiveDate>) -> String {
    date.map(|d| format!(" on {d}")).unwrap_or_default()
}

/// Which fiscal period a metric is read for.
///
/// Without a date, `years_back` indexes the fiscal periods directly (0 is the
/// most recent). With a date, counting starts at the most recent period that
/// ended on or before that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Reference date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Number of fiscal years to go back.
    #[serde(default)]
    pub years_back: usize,
}

impl Selection {
    /// The most recent period.
    pub const fn latest() -> Self {
        Self {
            date: None,
            years_back: 0,
        }
    }

    /// The most recent period known at `date`.
    pub const fn at(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            years_back: 0,
        }
    }

    /// Go back a number of fiscal years.
    pub const fn with_years_back(mut self, years_back: usize) -> Self {
        self.years_back = years_back;
        self
    }
}

/// Descriptive data of a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractInfo {
    /// Company name.
    pub long_name: String,
    /// Sector.
    pub sector: String,
    /// Current price.
    pub price: f64,
    /// Trailing price/earnings.
    pub trailing_pe: f64,
    /// Forward price/earnings.
    pub forward_pe: f64,
    /// Market capitalisation.
    pub market_cap: f64,
    /// Dividend yield.
    pub dividend_yield: f64,
    /// Payout ratio.
    pub payout_ratio: f64,
}

impl Default for ContractInfo {
    fn default() -> Self {
        Self {
            long_name: String::new(),
            sector: String::new(),
            price: f64::NAN,
            trailing_pe: f64::NAN,
            forward_pe: f64::NAN,
            market_cap: f64::NAN,
            dividend_yield: f64::NAN,
            payout_ratio: f64::NAN,
        }
    }
}

impl ContractInfo {
    /// Info with a name and sector.
    pub fn new(long_name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            long_name: long_name.into(),
            sector: sector.into(),
            ..Self::default()
        }
    }
}

/// One company: statements, descriptive data and prices.
#[derive(Debug, Clone)]
pub struct Contract {
    ticker: String,
    info: ContractInfo,
    income: Income,
    balance: BalanceSheet,
    cashflow: CashFlow,
    pricing: Option<PriceHistory>,
}

impl Contract {
    /// Empty contract for a ticker.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            info: ContractInfo::default(),
            income: Income::default(),
            balance: BalanceSheet::default(),
            cashflow: CashFlow::default(),
            pricing: None,
        }
    }

    /// Builder-style descriptive data.
    pub fn with_info(mut self, info: ContractInfo) -> Self {
        self.info = info;
        self
    }

    /// Builder-style price history.
    pub fn with_pricing(mut self, pricing: PriceHistory) -> Self {
        self.pricing = Some(pricing);
        self
    }

    /// Ticker.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Descriptive data.
    pub const fn info(&self) -> &ContractInfo {
        &self.info
    }

    /// Mutable descriptive data.
    pub const fn info_mut(&mut self) -> &mut ContractInfo {
        &mut self.info
    }

    /// Company name.
    pub fn long_name(&self) -> &str {
        &self.info.long_name
    }

    /// Sector.
    pub fn sector(&self) -> &str {
        &self.info.sector
    }

    /// Income statement.
    pub const fn income(&self) -> &Income {
        &self.income
    }

    /// Mutable income statement.
    pub const fn income_mut(&mut self) -> &mut Income {
        &mut self.income
    }

    /// Balance sheet.
    pub const fn balance(&self) -> &BalanceSheet {
        &self.balance
    }

    /// Mutable balance sheet.
    pub const fn balance_mut(&mut self) -> &mut BalanceSheet {
        &mut self.balance
    }

    /// Cash flow statement.
    pub const fn cashflow(&self) -> &CashFlow {
        &self.cashflow
    }

    /// Mutable cash flow statement.
    pub const fn cashflow_mut(&mut self) -> &mut CashFlow {
        &mut self.cashflow
    }

    /// Price history.
    pub const fn pricing(&self) -> Option<&PriceHistory> {
        self.pricing.as_ref()
    }

    /// Replace the price history.
    pub fn set_pricing(&mut self, pricing: Option<PriceHistory>) {
        self.pricing = pricing;
    }

    /// Chart-of-accounts type (taken from the income statement).
    pub const fn coa_type(&self) -> CoaType {
        self.income.coa_type()
    }

    /// Switch the layout of all three statements.
    pub fn set_coa_type(&mut self, coa_type: CoaType) {
        self.income.set_coa_type(coa_type);
        self.balance.set_coa_type(coa_type);
        self.cashflow.set_coa_type(coa_type);
    }

    /// Fiscal years, most recent first.
    pub fn fiscal_years(&self) -> &[i32] {
        self.income.fiscal_years()
    }

    /// Fiscal-year-end dates, most recent first.
    pub fn fiscal_year_end_dates(&self) -> &[NaiveDate] {
        self.income.fiscal_year_end_dates()
    }

    /// Set the fiscal periods of all three statements.
    pub fn set_periods(&mut self, fiscal_years: Vec<i32>, end_dates: Vec<NaiveDate>) -> Result<()> {
        self.income
            .set_periods(fiscal_years.clone(), end_dates.clone())?;
        self.balance
            .set_periods(fiscal_years.clone(), end_dates.clone())?;
        self.cashflow.set_periods(fiscal_years, end_dates)
    }

    /// Whether no statement field has been populated.
    pub fn has_no_statements(&self) -> bool {
        fn empty<F: LineItemField>(s: &Statement<F>) -> bool {
            F::ALL.iter().all(|f| !s.is_populated(*f))
        }
        empty(&self.income) && empty(&self.balance) && empty(&self.cashflow)
    }

    /// Index of the fiscal period a selection refers to.
    pub fn period_index(&self, at: &Selection) -> Option<usize> {
        let start = match at.date {
            None => 0,
            Some(date) => self.fiscal_year_end_dates().iter().position(|d| *d <= date)?,
        };
        Some(start + at.years_back)
    }

    /// Pick the value of a per-period series for a selection; NaN when the
    /// selection falls outside the series.
    pub fn value_at(&self, values: &[f64], at: &Selection) -> f64 {
        self.period_index(at)
            .and_then(|i| values.get(i))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// Price at a date, or the current price without a date.
    ///
    /// # Errors
    ///
    /// [`MetricError::NoPrice`] when neither the descriptive price nor the
    /// history has a price.
    pub fn price_at(&self, date: Option<NaiveDate>) -> std::result::Result<f64, MetricError> {
        let no_price = || MetricError::NoPrice {
            ticker: self.ticker.clone(),
            date,
        };
        let unreadable = |e: DataError| MetricError::Pricing {
            ticker: self.ticker.clone(),
            reason: e.to_string(),
        };
        match date {
            None if self.info.price.is_finite() => Ok(self.info.price),
            None => self
                .pricing
                .as_ref()
                .map(PriceHistory::latest_close)
                .transpose()
                .map_err(unreadable)?
                .flatten()
                .ok_or_else(no_price),
            Some(day) => self
                .pricing
                .as_ref()
                .map(|p| p.close_on_or_before(day))
                .transpose()
                .map_err(unreadable)?
                .flatten()
                .ok_or_else(no_price),
        }
    }

    /// Revenue.
    pub fn revenue(&self) -> Vec<f64> {
        self.income.revenue()
    }

    /// Net income.
    pub fn net_income(&self) -> Vec<f64> {
        self.income.net_income().to_vec()
    }

    /// EBIT plus depreciation and amortization.
    pub fn ebitda(&self) -> Vec<f64> {
        zip_with(
            &self.income.ebit(),
            &self.cashflow.depreciation_and_amortization(),
            |e, da| e + da,
        )
    }

    /// EBITDA as a percentage of revenue.
    pub fn ebitda_margin(&self) -> Vec<f64> {
        percent(&self.ebitda(), &self.revenue())
    }

    /// Net income as a percentage of total assets.
    pub fn return_on_assets(&self) -> Vec<f64> {
        percent(self.income.net_income(), self.balance.total_assets())
    }

    /// Net income as a percentage of equity.
    pub fn return_on_equity(&self) -> Vec<f64> {
        percent(self.income.net_income(), &self.balance.equity())
    }

    /// Net debt divided by free cash flow: years of free cash flow needed to
    /// repay the debt.
    pub fn dynamic_gearing(&self) -> Vec<f64> {
        zip_with(
            &self.balance.net_debt(),
            &self.cashflow.free_cashflow(),
            |d, f| d / f,
        )
    }

    fn per_share(&self, values: &[f64]) -> Vec<f64> {
        zip_with(values, self.balance.shares_outstanding(), |v, s| v / s)
    }

    /// Net income per share.
    pub fn earnings_per_share(&self) -> Vec<f64> {
        self.per_share(self.income.net_income())
    }

    /// Revenue per share.
    pub fn revenue_per_share(&self) -> Vec<f64> {
        self.per_share(&self.revenue())
    }

    /// Free cash flow per share.
    pub fn free_cashflow_per_share(&self) -> Vec<f64> {
        self.per_share(&self.cashflow.free_cashflow())
    }

    /// Book value per share as reported, or equity per share when the
    /// statement does not report it.
    pub fn book_value_per_share(&self) -> Vec<f64> {
        if self.balance.is_populated(BalanceField::BookValuePerShare) {
            self.balance.field(BalanceField::BookValuePerShare).to_vec()
        } else {
            self.per_share(&self.balance.equity())
        }
    }

    /// Annualized earnings-per-share growth in percent.
    pub fn earnings_per_share_growth(&self, years: usize) -> Vec<f64> {
        growth::growth(&self.earnings_per_share(), years)
    }

    /// Annualized revenue-per-share growth in percent.
    pub fn revenue_per_share_growth(&self, years: usize) -> Vec<f64> {
        growth::growth(&self.revenue_per_share(), years)
    }

    /// Annualized free-cash-flow-per-share growth in percent.
    pub fn free_cashflow_per_share_growth(&self, years: usize) -> Vec<f64> {
        growth::growth(&self.free_cashflow_per_share(), years)
    }

    /// Annualized book-value-per-share growth in percent.
    pub fn book_value_per_share_growth(&self, years: usize) -> Vec<f64> {
        growth::growth(&self.book_value_per_share(), years)
    }

    fn price_ratio(
        &self,
        per_share: &[f64],
        at: &Selection,
    ) -> std::result::Result<f64, MetricError> {
        let price = self.price_at(at.date)?;
        Ok(price / self.value_at(per_share, at))
    }

    /// Price over earnings per share.
    pub fn price_to_earnings(&self, at: &Selection) -> std::result::Result<f64, MetricError> {
        self.price_ratio(&self.earnings_per_share(), at)
    }

    /// Price over revenue per share.
    pub fn price_to_revenue(&self, at: &Selection) -> std::result::Result<f64, MetricError> {
        self.price_ratio(&self.revenue_per_share(), at)
    }

    /// Price over free cash flow per share.
    pub fn price_to_free_cashflow(&self, at: &Selection) -> std::result::Result<f64, MetricError> {
        self.price_ratio(&self.free_cashflow_per_share(), at)
    }

    /// Price over book value per share.
    pub fn price_to_book(&self, at: &Selection) -> std::result::Result<f64, MetricError> {
        self.price_ratio(&self.book_value_per_share(), at)
    }

    /// Price/earnings over earnings-per-share growth.
    pub fn peg(&self, growth_years: usize, at: &Selection) -> std::result::Result<f64, MetricError> {
        Ok(self.price_to_earnings(at)? / self.value_at(&self.earnings_per_share_growth(growth_years), at))
    }

    /// Price/revenue over revenue-per-share growth.
    pub fn prg(&self, growth_years: usize, at: &Selection) -> std::result::Result<f64, MetricError> {
        Ok(self.price_to_revenue(at)? / self.value_at(&self.revenue_per_share_growth(growth_years), at))
    }

    /// Price/free cash flow over free-cash-flow-per-share growth.
    pub fn pfcg(&self, growth_years: usize, at: &Selection) -> std::result::Result<f64, MetricError> {
        Ok(self.price_to_free_cashflow(at)?
            / self.value_at(&self.free_cashflow_per_share_growth(growth_years), at))
    }

    /// Price/book over book-value-per-share growth.
    pub fn pbg(&self, growth_years: usize, at: &Selection) -> std::result::Result<f64, MetricError> {
        Ok(self.price_to_book(at)? / self.value_at(&self.book_value_per_share_growth(growth_years), at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceBar;
    use crate::statement::{CashFlowField, IncomeField};
    use approx::assert_relative_eq;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    }

    fn contract() -> Contract {
        let mut c = Contract::new("ACME").with_info(ContractInfo::new("Acme Corp", "Industrials"));
        c.set_periods(vec![2023, 2022, 2021], vec![date(2023), date(2022), date(2021)])
            .unwrap();
        c.income_mut()
            .set_field(IncomeField::Revenue, vec![1000.0, 900.0, 800.0])
            .unwrap();
        c.income_mut()
            .set_field(IncomeField::TotalOperatingExpenses, vec![800.0, 750.0, 700.0])
            .unwrap();
        c.income_mut()
            .set_field(IncomeField::NetIncome, vec![121.0, 110.0, 100.0])
            .unwrap();
        c.balance_mut()
            .set_field(BalanceField::TotalAssets, vec![2000.0, 1900.0, 1800.0])
            .unwrap();
        c.balance_mut()
            .set_field(BalanceField::TotalLiabilities, vec![1200.0, 1100.0, 1000.0])
            .unwrap();
        c.balance_mut()
            .set_field(BalanceField::TotalOutstandingSharesCommonStock, vec![10.0, 10.0, 10.0])
            .unwrap();
        c.cashflow_mut()
            .set_field(CashFlowField::Depreciation, vec![50.0, 40.0, 30.0])
            .unwrap();
        c.cashflow_mut()
            .set_field(CashFlowField::Amortization, vec![f64::NAN; 3])
            .unwrap();
        c
    }

    #[test]
    fn test_fresh_contract_is_empty() {
        let c = Contract::new("NEW");
        assert!(c.has_no_statements());
        assert!(c.fiscal_years().is_empty());
        assert!(!contract().has_no_statements());
    }

    #[test]
    fn test_cross_statement_metrics() {
        let c = contract();
        assert_eq!(c.ebitda()[0], 250.0);
        assert_relative_eq!(c.ebitda_margin()[0], 25.0);
        assert_relative_eq!(c.return_on_assets()[0], 6.05);
        assert_relative_eq!(c.return_on_equity()[0], 15.125);
        assert_relative_eq!(c.earnings_per_share()[0], 12.1);
        assert_relative_eq!(c.book_value_per_share()[0], 80.0);
    }

    #[test]
    fn test_value_at_selection() {
        let c = contract();
        let eps = c.earnings_per_share();
        assert_relative_eq!(c.value_at(&eps, &Selection::latest()), 12.1);
        assert_relative_eq!(c.value_at(&eps, &Selection::latest().with_years_back(2)), 10.0);
        let mid_2023 = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
        assert_relative_eq!(c.value_at(&eps, &Selection::at(mid_2023)), 11.0);
        assert!(c.value_at(&eps, &Selection::latest().with_years_back(3)).is_nan());
        let too_early = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(c.value_at(&eps, &Selection::at(too_early)).is_nan());
    }

    #[test]
    fn test_price_at() {
        let c = contract();
        assert!(matches!(c.price_at(None), Err(MetricError::NoPrice { .. })));

        let history = PriceHistory::from_bars(vec![
            PriceBar::flat(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(), 100.0),
            PriceBar::flat(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 120.0),
        ])
        .unwrap();
        let mut c = c.with_pricing(history);
        assert_eq!(c.price_at(None).unwrap(), 120.0);
        assert_eq!(
            c.price_at(NaiveDate::from_ymd_opt(2023, 12, 31)).unwrap(),
            100.0
        );
        assert!(c.price_at(NaiveDate::from_ymd_opt(2023, 1, 1)).is_err());

        c.info_mut().price = 130.0;
        assert_eq!(c.price_at(None).unwrap(), 130.0);
    }

    #[test]
    fn test_peg() {
        let mut c = contract();
        c.info_mut().price = 121.0;
        let at = Selection::latest();
        assert_relative_eq!(c.price_to_earnings(&at).unwrap(), 10.0);
        // eps growth over two years is 10% per year
        assert_relative_eq!(c.peg(2, &at).unwrap(), 1.0, epsilon = 1e-9);
        assert!(c.peg(5, &at).unwrap().is_nan());
    }

    #[test]
    fn test_dynamic_gearing_without_cashflow_is_nan() {
        let c = contract();
        assert!(c.dynamic_gearing()[0].is_nan());
    }
}
