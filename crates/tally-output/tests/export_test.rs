//! Exports written to disk.

use chrono::NaiveDate;
use std::path::PathBuf;
use tally_data::{BalanceField, Contract, ContractInfo, Contracts, Selection};
use tally_output::{ExportFormat, Exporter, RankingSummary};
use tally_ranking::{
    BacktestConfig, BacktestReport, BenchmarkReturn, Ranking, RuleKind, RuleSpec, Snapshot,
    build_rules,
};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tally-output-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

fn contracts() -> Contracts {
    [("AAA", 45.0), ("BBB", 15.0)]
        .into_iter()
        .map(|(ticker, equity)| {
            let mut contract =
                Contract::new(ticker).with_info(ContractInfo::new(format!("{ticker} Inc"), "Tech"));
            contract
                .set_periods(vec![2023], vec![NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()])
                .unwrap();
            contract
                .balance_mut()
                .set_field(BalanceField::TotalAssets, vec![100.0])
                .unwrap();
            contract
                .balance_mut()
                .set_field(BalanceField::TotalLiabilities, vec![100.0 - equity])
                .unwrap();
            contract
        })
        .collect()
}

#[test]
fn test_ranking_csv_file() {
    let ranking = Ranking::new(build_rules(&[RuleSpec::preset(RuleKind::EquityRatio)]).unwrap());
    let table = ranking.rank(&contracts(), &Selection::latest());
    let path = scratch("ranking.csv");
    table
        .export_to_file(&path, ExportFormat::from_path(&path).unwrap())
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("Equity Ratio,Equity Ratio Score"));
    assert!(lines[1].starts_with("AAA,AAA Inc,Tech,100.00%"));
    assert!(lines[2].starts_with("BBB,BBB Inc,Tech,"));

    let summary = RankingSummary::new(&table, Some(1));
    assert_eq!(summary.contracts.len(), 1);
    assert_eq!(summary.contracts[0].ticker, "AAA");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_backtest_csv() {
    let report = BacktestReport {
        config: BacktestConfig {
            benchmarks: vec!["SPX".to_string(), "MXWO".to_string()],
            ..BacktestConfig::default()
        },
        snapshots: vec![Snapshot {
            date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
            tickers: vec!["AAA".to_string(), "BBB".to_string()],
            weights: vec![1.0, 0.5],
            returns: vec![0.1, 0.2],
            equal_weighted: 0.15,
            score_weighted: 0.5,
            equal_curve: vec![0.1, 0.15],
            weighted_curve: vec![0.1, 0.5],
            benchmarks: vec![BenchmarkReturn {
                ticker: "SPX".to_string(),
                forward_return: 0.25,
            }],
        }],
    };
    let csv = report.export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Contracts,Equal Weighted,Score Weighted,SPX,MXWO");
    assert_eq!(lines[1], "2022-01-03,2,0.15,0.5,0.25,");

    let json = report.export_to_string(ExportFormat::PrettyJson).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["snapshots"][0]["tickers"][1], "BBB");
}
