//! Brokerage `ReportsFinStatements` XML exports.
//!
//! The export carries the chart-of-accounts type of the company, a map from
//! line-item codes to display names and, per annual fiscal period, one
//! `Statement` element per statement type with `lineItem` values keyed by
//! code. Values are in millions already.
//!
//! ```xml
//! <ReportFinancialStatements>
//!   <StatementInfo><COAType Code="IND">Industry</COAType></StatementInfo>
//!   <FinancialStatements>
//!     <COAMap>
//!       <mapItem coaItem="RTLR" statementType="INC">Total Revenue</mapItem>
//!     </COAMap>
//!     <AnnualPeriods>
//!       <FiscalPeriod Type="Annual" EndDate="2023-09-30" FiscalYear="2023">
//!         <Statement Type="INC">
//!           <lineItem coaCode="RTLR">383285.0</lineItem>
//!         </Statement>
//!       </FiscalPeriod>
//!     </AnnualPeriods>
//!   </FinancialStatements>
//! </ReportFinancialStatements>
//! ```

use crate::contract::Contract;
use crate::error::{DataError, Result};
use crate::statement::{CoaType, LineItemField, Statement, StatementKind};
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// One annual period of a brokerage export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokeragePeriod {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Period end date.
    pub end_date: NaiveDate,
    /// Line-item values by statement and code.
    pub statements: BTreeMap<StatementKind, BTreeMap<String, f64>>,
}

impl BrokeragePeriod {
    /// Value of a line item.
    pub fn value(&self, kind: StatementKind, code: &str) -> Option<f64> {
        self.statements.get(&kind).and_then(|s| s.get(code)).copied()
    }
}

/// Parsed brokerage export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerageReport {
    coa_type: CoaType,
    coa_map: BTreeMap<String, String>,
    periods: Vec<BrokeragePeriod>,
}

#[derive(Default)]
struct ParseState {
    path: Vec<String>,
    period: Option<BrokeragePeriod>,
    statement: Option<StatementKind>,
    line_item: Option<String>,
    map_item: Option<String>,
}

impl ParseState {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match local_name(e).as_str() {
            "FiscalPeriod" if self.path.iter().any(|p| p == "AnnualPeriods") => {
                let year = attribute(e, "FiscalYear")?
                    .ok_or_else(|| DataError::Parse("FiscalPeriod without FiscalYear".to_string()))?;
                let end = attribute(e, "EndDate")?
                    .ok_or_else(|| DataError::Parse("FiscalPeriod without EndDate".to_string()))?;
                self.period = Some(BrokeragePeriod {
                    fiscal_year: parse_year(&year)?,
                    end_date: parse_date(&end)?,
                    statements: BTreeMap::new(),
                });
            }
            "Statement" if self.period.is_some() => {
                self.statement = attribute(e, "Type")?.and_then(|t| StatementKind::from_code(&t));
            }
            "lineItem" => self.line_item = attribute(e, "coaCode")?,
            "mapItem" => self.map_item = attribute(e, "coaItem")?,
            _ => {}
        }
        Ok(())
    }
}

impl BrokerageReport {
    /// Parse an export.
    ///
    /// # Errors
    ///
    /// [`DataError::XmlParse`] for malformed XML, [`DataError::InvalidCoaType`]
    /// for an unsupported `COAType`, [`DataError::InvalidDate`] or
    /// [`DataError::Parse`] for malformed period attributes.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut report = Self::default();
        let mut state = ParseState::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    state.open(&e)?;
                    state.path.push(local_name(&e));
                }
                Ok(Event::Empty(e)) => {
                    state.open(&e)?;
                    report.close(&mut state, &local_name(&e));
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(xml_error)?;
                    report.text(&mut state, text.trim())?;
                }
                Ok(Event::End(_)) => {
                    if let Some(name) = state.path.pop() {
                        report.close(&mut state, &name);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(e)),
            }
            buf.clear();
        }

        report
            .periods
            .sort_by(|a, b| b.end_date.cmp(&a.end_date));
        Ok(report)
    }

    /// Read and parse an export file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    fn text(&mut self, state: &mut ParseState, text: &str) -> Result<()> {
        match state.path.last().map(String::as_str) {
            Some("COAType") => self.coa_type = text.parse()?,
            Some("mapItem") => {
                if let Some(code) = state.map_item.take() {
                    self.coa_map.insert(code, text.to_string());
                }
            }
            Some("lineItem") => {
                let (Some(period), Some(kind), Some(code)) =
                    (state.period.as_mut(), state.statement, state.line_item.as_ref())
                else {
                    return Ok(());
                };
                match text.parse::<f64>() {
                    Ok(value) => {
                        period
                            .statements
                            .entry(kind)
                            .or_default()
                            .insert(code.clone(), value);
                    }
                    Err(_) => debug!(code = %code, text, "non-numeric line item skipped"),
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, state: &mut ParseState, name: &str) {
        match name {
            "FiscalPeriod" => {
                if let Some(period) = state.period.take() {
                    self.periods.push(period);
                }
            }
            "Statement" => state.statement = None,
            "lineItem" => state.line_item = None,
            "mapItem" => state.map_item = None,
            _ => {}
        }
    }

    /// Chart-of-accounts type.
    pub const fn coa_type(&self) -> CoaType {
        self.coa_type
    }

    /// Display names of the line-item codes.
    pub const fn coa_map(&self) -> &BTreeMap<String, String> {
        &self.coa_map
    }

    /// Annual periods, most recent first.
    pub fn periods(&self) -> &[BrokeragePeriod] {
        &self.periods
    }

    /// Fiscal years, most recent first.
    pub fn fiscal_years(&self) -> Vec<i32> {
        self.periods.iter().map(|p| p.fiscal_year).collect()
    }

    /// Merge an older export of the same company: its periods whose fiscal
    /// year is missing here are added.
    pub fn merge(mut self, older: Self) -> Self {
        let years: BTreeSet<i32> = self.periods.iter().map(|p| p.fiscal_year).collect();
        self.periods.extend(
            older
                .periods
                .into_iter()
                .filter(|p| !years.contains(&p.fiscal_year)),
        );
        self.periods.sort_by(|a, b| b.end_date.cmp(&a.end_date));
        for (code, name) in older.coa_map {
            self.coa_map.entry(code).or_insert(name);
        }
        self
    }

    /// Populate the statements of a contract.
    ///
    /// Sets the layout and fiscal periods, then every code the export reports
    /// for at least one period; periods lacking a code hold NaN. Codes the
    /// statement does not declare are skipped.
    pub fn populate(&self, contract: &mut Contract) -> Result<()> {
        contract.set_coa_type(self.coa_type);
        contract.set_periods(
            self.fiscal_years(),
            self.periods.iter().map(|p| p.end_date).collect(),
        )?;
        fill(contract.income_mut(), &self.periods)?;
        fill(contract.balance_mut(), &self.periods)?;
        fill(contract.cashflow_mut(), &self.periods)
    }
}

fn fill<F: LineItemField>(statement: &mut Statement<F>, periods: &[BrokeragePeriod]) -> Result<()> {
    let codes: BTreeSet<&str> = periods
        .iter()
        .filter_map(|p| p.statements.get(&F::KIND))
        .flat_map(|s| s.keys().map(String::as_str))
        .collect();
    for code in codes {
        let Some(field) = F::from_code(code).filter(|f| f.applies_to(statement.coa_type())) else {
            debug!(code, statement = %F::KIND, "line item not tracked");
            continue;
        };
        let values = periods
            .iter()
            .map(|p| p.value(F::KIND, code).unwrap_or(f64::NAN))
            .collect();
        statement.set_field(field, values)?;
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(e: impl std::fmt::Display) -> DataError {
    DataError::XmlParse(e.to_string())
}

fn parse_year(raw: &str) -> Result<i32> {
    raw.trim()
        .get(..4)
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| DataError::Parse(format!("invalid fiscal year '{raw}'")))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d")
        .map_err(|_| DataError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{BalanceField, CashFlowField, IncomeField};

    const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ReportFinancialStatements Major="1" Minor="0">
  <CoIDs><CoID Type="CompanyName">Acme &amp; Sons</CoID></CoIDs>
  <StatementInfo><COAType Code="IND">Industry</COAType></StatementInfo>
  <FinancialStatements>
    <COAMap>
      <mapItem coaItem="RTLR" statementType="INC" lineID="10">Total Revenue</mapItem>
      <mapItem coaItem="NINC" statementType="INC" lineID="20">Net Income</mapItem>
    </COAMap>
    <AnnualPeriods>
      <FiscalPeriod Type="Annual" EndDate="2022-12-31" FiscalYear="2022">
        <Statement Type="INC">
          <FPHeader><PeriodLength>12</PeriodLength></FPHeader>
          <lineItem coaCode="RTLR">900.5</lineItem>
          <lineItem coaCode="NINC">90</lineItem>
        </Statement>
        <Statement Type="BAL">
          <lineItem coaCode="ATOT">2000</lineItem>
          <lineItem coaCode="XXXX">1</lineItem>
        </Statement>
      </FiscalPeriod>
      <FiscalPeriod Type="Annual" EndDate="2023-12-31" FiscalYear="2023">
        <Statement Type="INC">
          <lineItem coaCode="RTLR">1000</lineItem>
          <lineItem coaCode="NINC">100</lineItem>
          <lineItem coaCode="ERAD"/>
        </Statement>
        <Statement Type="CAS">
          <lineItem coaCode="OTLO">150</lineItem>
        </Statement>
      </FiscalPeriod>
    </AnnualPeriods>
    <InterimPeriods>
      <FiscalPeriod Type="Interim" EndDate="2024-03-31" FiscalYear="2024">
        <Statement Type="INC"><lineItem coaCode="RTLR">250</lineItem></Statement>
      </FiscalPeriod>
    </InterimPeriods>
  </FinancialStatements>
</ReportFinancialStatements>"#;

    #[test]
    fn test_parse_export() {
        let report = BrokerageReport::parse(EXPORT).unwrap();
        assert_eq!(report.coa_type(), CoaType::Industry);
        assert_eq!(report.fiscal_years(), vec![2023, 2022]);
        assert_eq!(report.coa_map()["RTLR"], "Total Revenue");
        assert_eq!(report.periods()[1].value(StatementKind::Income, "RTLR"), Some(900.5));
        assert_eq!(report.periods()[0].value(StatementKind::Income, "ERAD"), None);
    }

    #[test]
    fn test_populate_contract() {
        let report = BrokerageReport::parse(EXPORT).unwrap();
        let mut contract = Contract::new("ACME");
        report.populate(&mut contract).unwrap();

        assert_eq!(contract.fiscal_years(), &[2023, 2022]);
        assert_eq!(contract.income().field(IncomeField::Revenue), &[1000.0, 900.5]);
        assert_eq!(contract.income().net_income(), &[100.0, 90.0]);

        let assets = contract.balance().field(BalanceField::TotalAssets);
        assert!(assets[0].is_nan());
        assert_eq!(assets[1], 2000.0);

        let ocf = contract.cashflow().field(CashFlowField::OperatingCashflow);
        assert_eq!(ocf[0], 150.0);
        assert!(ocf[1].is_nan());
        assert!(!contract.cashflow().is_populated(CashFlowField::CapitalExpenditure));
    }

    #[test]
    fn test_bank_export() {
        let xml = r#"<R><StatementInfo><COAType Code="BNK">Bank</COAType></StatementInfo>
            <FinancialStatements><AnnualPeriods>
            <FiscalPeriod Type="Annual" EndDate="2023-12-31" FiscalYear="2023">
              <Statement Type="INC">
                <lineItem coaCode="SIIB">70</lineItem>
                <lineItem coaCode="SNII">30</lineItem>
                <lineItem coaCode="RTLR">5</lineItem>
              </Statement>
            </FiscalPeriod></AnnualPeriods></FinancialStatements></R>"#;
        let mut contract = Contract::new("BANK");
        BrokerageReport::parse(xml).unwrap().populate(&mut contract).unwrap();
        assert_eq!(contract.coa_type(), CoaType::Bank);
        assert_eq!(contract.revenue(), vec![100.0]);
    }

    #[test]
    fn test_invalid_coa_type() {
        let xml = "<R><StatementInfo><COAType>Broker</COAType></StatementInfo></R>";
        assert!(matches!(
            BrokerageReport::parse(xml),
            Err(DataError::InvalidCoaType(_))
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            BrokerageReport::parse("<R><StatementInfo></R>"),
            Err(DataError::XmlParse(_))
        ));
    }

    #[test]
    fn test_merge_adds_missing_years() {
        let newer = BrokerageReport::parse(EXPORT).unwrap();
        let older_xml = EXPORT
            .replace("2023-12-31", "2021-12-31")
            .replace("FiscalYear=\"2023\"", "FiscalYear=\"2021\"");
        let older = BrokerageReport::parse(&older_xml).unwrap();

        let merged = newer.merge(older);
        assert_eq!(merged.fiscal_years(), vec![2023, 2022, 2021]);
        assert_eq!(merged.periods()[1].value(StatementKind::Income, "RTLR"), Some(900.5));
    }
}
