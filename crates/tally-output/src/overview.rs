//! Contract overview table.
//!
//! One row per contract with its descriptive data and the headline metrics of
//! the selected fiscal period.

use crate::export::{ExportError, ExportFormat, Exporter, finish_csv};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tally_data::{Contract, Contracts, Selection};

/// Overview of one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewRow {
    /// Ticker.
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Company name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Sector.
    #[serde(rename = "Sector")]
    pub sector: String,
    /// Statement layout.
    #[serde(rename = "COA Type")]
    pub coa_type: String,
    /// Fiscal year of the selected period.
    #[serde(rename = "Fiscal Year")]
    pub fiscal_year: Option<i32>,
    /// Number of fiscal periods.
    #[serde(rename = "Periods")]
    pub periods: usize,
    /// Current price.
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    /// Market capitalization.
    #[serde(rename = "Market Cap")]
    pub market_cap: Option<f64>,
    /// Revenue.
    #[serde(rename = "Revenue")]
    pub revenue: Option<f64>,
    /// Net income.
    #[serde(rename = "Net Income")]
    pub net_income: Option<f64>,
    /// Netto margin in percent.
    #[serde(rename = "Netto Margin")]
    pub netto_margin: Option<f64>,
    /// Equity ratio in percent.
    #[serde(rename = "Equity Ratio")]
    pub equity_ratio: Option<f64>,
    /// Return on assets in percent.
    #[serde(rename = "Return on Assets")]
    pub return_on_assets: Option<f64>,
    /// Free cash flow.
    #[serde(rename = "Free Cashflow")]
    pub free_cashflow: Option<f64>,
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl OverviewRow {
    /// Overview of a contract at a selection.
    pub fn new(contract: &Contract, at: &Selection) -> Self {
        let pick = |values: &[f64]| finite(contract.value_at(values, at));
        Self {
            ticker: contract.ticker().to_string(),
            name: contract.long_name().to_string(),
            sector: contract.sector().to_string(),
            coa_type: contract.coa_type().to_string(),
            fiscal_year: contract
                .period_index(at)
                .and_then(|i| contract.fiscal_years().get(i))
                .copied(),
            periods: contract.fiscal_years().len(),
            price: finite(contract.info().price),
            market_cap: finite(contract.info().market_cap),
            revenue: pick(&contract.revenue()),
            net_income: pick(&contract.net_income()),
            netto_margin: pick(&contract.income().netto_margin()),
            equity_ratio: pick(&contract.balance().equity_ratio()),
            return_on_assets: pick(&contract.return_on_assets()),
            free_cashflow: pick(&contract.cashflow().free_cashflow()),
        }
    }
}

/// Overview of a collection of contracts, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractOverview {
    /// Rows.
    pub rows: Vec<OverviewRow>,
}

impl ContractOverview {
    /// Build the overview.
    pub fn new(contracts: &Contracts, at: &Selection) -> Self {
        Self {
            rows: contracts.iter().map(|c| OverviewRow::new(c, at)).collect(),
        }
    }

    /// Overview as a `DataFrame` with one column per field.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let text = |name: &str, f: fn(&OverviewRow) -> String| -> Column {
            Series::new(name.into(), self.rows.iter().map(f).collect::<Vec<_>>()).into()
        };
        let number = |name: &str, f: fn(&OverviewRow) -> Option<f64>| -> Column {
            Series::new(name.into(), self.rows.iter().map(f).collect::<Vec<_>>()).into()
        };
        DataFrame::new(vec![
            text("ticker", |r| r.ticker.clone()),
            text("name", |r| r.name.clone()),
            text("sector", |r| r.sector.clone()),
            text("coa_type", |r| r.coa_type.clone()),
            Series::new(
                "fiscal_year".into(),
                self.rows.iter().map(|r| r.fiscal_year).collect::<Vec<_>>(),
            )
            .into(),
            number("price", |r| r.price),
            number("market_cap", |r| r.market_cap),
            number("revenue", |r| r.revenue),
            number("net_income", |r| r.net_income),
            number("netto_margin", |r| r.netto_margin),
            number("equity_ratio", |r| r.equity_ratio),
            number("return_on_assets", |r| r.return_on_assets),
            number("free_cashflow", |r| r.free_cashflow),
        ])
    }
}

impl Exporter for ContractOverview {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in &self.rows {
                    wtr.serialize(row)?;
                }
                finish_csv(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_data::{BalanceField, ContractInfo, IncomeField};

    fn contracts() -> Contracts {
        let mut info = ContractInfo::new("Acme", "Industrials");
        info.price = 12.5;
        let mut acme = Contract::new("ACME").with_info(info);
        acme.set_periods(
            vec![2023, 2022],
            vec![
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            ],
        )
        .unwrap();
        acme.income_mut()
            .set_field(IncomeField::Revenue, vec![200.0, 100.0])
            .unwrap();
        acme.income_mut()
            .set_field(IncomeField::NetIncome, vec![20.0, 5.0])
            .unwrap();
        acme.balance_mut()
            .set_field(BalanceField::TotalAssets, vec![400.0, 300.0])
            .unwrap();

        let empty = Contract::new("EMPTY").with_info(ContractInfo::new("Empty", "Utilities"));
        [acme, empty].into_iter().collect()
    }

    #[test]
    fn test_overview_rows() {
        let overview = ContractOverview::new(&contracts(), &Selection::latest());
        let acme = &overview.rows[0];
        assert_eq!(acme.fiscal_year, Some(2023));
        assert_eq!(acme.periods, 2);
        assert_eq!(acme.price, Some(12.5));
        assert_eq!(acme.netto_margin, Some(10.0));
        assert_eq!(acme.return_on_assets, Some(5.0));
        assert_eq!(acme.equity_ratio, None);

        let empty = &overview.rows[1];
        assert_eq!(empty.fiscal_year, None);
        assert_eq!(empty.revenue, None);
    }

    #[test]
    fn test_overview_previous_year() {
        let overview = ContractOverview::new(&contracts(), &Selection::latest().with_years_back(1));
        assert_eq!(overview.rows[0].fiscal_year, Some(2022));
        assert_eq!(overview.rows[0].netto_margin, Some(5.0));
    }

    #[test]
    fn test_overview_frame() {
        let frame = ContractOverview::new(&contracts(), &Selection::latest())
            .to_frame()
            .unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 13);
        let revenue = frame.column("revenue").unwrap().f64().unwrap();
        assert_eq!(revenue.get(0), Some(200.0));
        assert_eq!(revenue.get(1), None);
    }

    #[test]
    fn test_overview_csv() {
        let csv = ContractOverview::new(&contracts(), &Selection::latest())
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Ticker,Name,Sector,COA Type,Fiscal Year,Periods,Price"));
        let empty = lines.nth(1).unwrap();
        assert!(empty.starts_with("EMPTY,Empty,Utilities,"));
        assert!(empty.ends_with(",,,,,,"));
    }
}
