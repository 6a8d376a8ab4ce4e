//! End-to-end tests: SEC-style reports to contract statements.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use tally_data::{
    Contract, ContractAggregator, DataError, IncomeField, RawReport, ResolutionConfig,
    StatementKind, StatementReader, TimeSeries,
};

fn report_json(year: i32, unit: &str, revenue: f64, net_income: f64) -> String {
    format!(
        r#"{{
        "ticker": "ACME",
        "source": "acme-{year}.json",
        "sheets": [
            {{
                "name": "Document and Entity Informatio",
                "columns": ["12 Months Ended Dec. 31, {year}"],
                "rows": [{{"label": "Entity Registrant Name", "values": [null]}}]
            }},
            {{
                "name": "Consolidated Statements of Oper",
                "caption": "CONSOLIDATED STATEMENTS OF OPERATIONS - USD ($) shares in Millions, $ in {unit}",
                "columns": ["3 Months Ended Dec. 31, {year}", "12 Months Ended Dec. 31, {year}", "12 Months Ended Dec. 31, {prior}"],
                "rows": [
                    {{"label": "Revenues", "values": [1.0, {revenue}, 1.0]}},
                    {{"label": "Total revenues", "values": [1.0, {revenue}, 1.0]}},
                    {{"label": "Cost of revenues", "values": [1.0, 5.0, 1.0]}},
                    {{"label": "Net income", "values": [1.0, {net_income}, 1.0]}}
                ]
            }},
            {{
                "name": "Consolidated Statements of Comp",
                "columns": ["12 Months Ended Dec. 31, {year}"],
                "rows": [{{"label": "Net income", "values": [{net_income}]}}]
            }}
        ]
    }}"#,
        prior = year - 1
    )
}

#[test]
fn test_read_statement_end_to_end() {
    let config = ResolutionConfig::default();
    let reader = StatementReader::new(&config);
    let report = RawReport::from_json(&report_json(2023, "Thousands", 2_500_000.0, 250_000.0)).unwrap();

    let sheet = reader.select_sheet(&report, StatementKind::Income).unwrap();
    assert_eq!(sheet.name, "Consolidated Statements of Oper");

    let record = reader.read_statement(&report, StatementKind::Income).unwrap();
    assert_eq!(record.fiscal_year, 2023);
    assert_eq!(record.fiscal_year_end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    assert_eq!(record.source, "acme-2023.json");
    assert_relative_eq!(record.values["revenue"], 2_500.0);
    assert_relative_eq!(record.values["net_income"], 250.0);
}

#[test]
fn test_unit_scaling_is_idempotent() {
    let config = ResolutionConfig::default();
    let reader = StatementReader::new(&config);
    let thousands = RawReport::from_json(&report_json(2023, "Thousands", 2_500_000.0, 250_000.0)).unwrap();
    let millions = RawReport::from_json(&report_json(2023, "Millions", 2_500.0, 250.0)).unwrap();

    let a = reader.read_statement(&thousands, StatementKind::Income).unwrap();
    let b = reader.read_statement(&millions, StatementKind::Income).unwrap();
    for (field, value) in &a.values {
        assert_relative_eq!(*value, b.values[field]);
    }
}

#[test]
fn test_conflicting_rows_fail_the_document() {
    let json = report_json(2023, "Millions", 2_500.0, 250.0).replace(
        r#"{"label": "Cost of revenues""#,
        r#"{"label": "Net income", "values": [1.0, 999.0, 1.0]}, {"label": "Cost of revenues""#,
    );
    let config = ResolutionConfig::default();
    let report = RawReport::from_json(&json).unwrap();
    let err = StatementReader::new(&config)
        .read_statement(&report, StatementKind::Income)
        .unwrap_err();
    assert!(matches!(err, DataError::AmbiguousValue { ref field, .. } if field == "net_income"));
}

#[test]
fn test_reports_into_contract() {
    let config = ResolutionConfig::default();
    let reader = StatementReader::new(&config);
    let records = [
        (2021, 60.0),
        (2023, 100.0),
        (2022, 80.0),
    ]
    .into_iter()
    .map(|(year, net_income)| {
        let report = RawReport::from_json(&report_json(year, "Millions", net_income * 10.0, net_income)).unwrap();
        reader.read_statement(&report, StatementKind::Income).unwrap()
    });
    let series = TimeSeries::stitch(records);

    let mut contract = Contract::new("ACME");
    let warnings = ContractAggregator::merge(&mut contract, StatementKind::Income, &series).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(contract.fiscal_years(), &[2023, 2022, 2021]);
    assert_eq!(contract.income().net_income(), &[100.0, 80.0, 60.0]);
    assert_eq!(contract.income().field(IncomeField::Revenue), &[1000.0, 800.0, 600.0]);
    assert_relative_eq!(contract.income().netto_margin()[0], 10.0);
}
