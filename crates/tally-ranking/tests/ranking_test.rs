//! Ranking behavior over contracts built from statements.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rstest::rstest;
use tally_data::{BalanceField, Contract, ContractInfo, Contracts, IncomeField, Selection};
use tally_ranking::{
    RangeRankingObject, Ranking, RankingFlag, RankingObject, RuleKind, RuleSpec, build_rules,
    rule::{range_score, series_accessor},
};

fn ymd(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
}

fn company(ticker: &str, name: &str, sector: &str, equity: [f64; 3], assets: [f64; 3]) -> Contract {
    let mut contract = Contract::new(ticker).with_info(ContractInfo::new(name, sector));
    contract
        .set_periods(vec![2023, 2022, 2021], vec![ymd(2023), ymd(2022), ymd(2021)])
        .unwrap();
    let balance = contract.balance_mut();
    let liabilities: Vec<f64> = assets.iter().zip(equity).map(|(a, e)| a - e).collect();
    balance
        .set_field(BalanceField::TotalAssets, assets.to_vec())
        .unwrap();
    balance
        .set_field(BalanceField::TotalLiabilities, liabilities)
        .unwrap();
    contract
}

fn net_income_rule() -> Box<dyn RankingObject> {
    Box::new(
        RangeRankingObject::new(
            "Net Income",
            series_accessor(Contract::net_income),
            vec![70.0, 90.0],
            vec![0.0, 1.0, 2.0],
        )
        .unwrap(),
    )
}

#[rstest]
#[case(9.999, 0.0)]
#[case(10.0, 1.0)]
#[case(29.999, 1.0)]
#[case(30.0, 2.0)]
#[case(-1e9, 0.0)]
#[case(1e9, 2.0)]
fn test_range_boundaries(#[case] value: f64, #[case] expected: f64) {
    assert_eq!(range_score(value, &[10.0, 30.0], &[0.0, 1.0, 2.0]).unwrap(), expected);
}

#[test]
fn test_net_income_rule_end_to_end() {
    let mut contract = Contract::new("ACME").with_info(ContractInfo::new("Acme", "Industrials"));
    contract
        .set_periods(vec![2023, 2022, 2021], vec![ymd(2023), ymd(2022), ymd(2021)])
        .unwrap();
    contract
        .income_mut()
        .set_field(IncomeField::NetIncome, vec![100.0, 80.0, 60.0])
        .unwrap();

    let ranking = Ranking::new(vec![net_income_rule()]);
    let latest = ranking.rank_contract(&contract, &Selection::latest());
    assert_eq!(latest.results[0].flag(), RankingFlag::Ok);
    assert_eq!(latest.results[0].value(), 100.0);
    assert_eq!(latest.results[0].score(), 1.0);
    assert_eq!(latest.relative_score, 1.0);

    let previous = ranking.rank_contract(&contract, &Selection::latest().with_years_back(1));
    assert_eq!(previous.results[0].score(), 0.5);

    // only the 2021 period is known in mid 2022
    let at = Selection::at(NaiveDate::from_ymd_opt(2022, 6, 30).unwrap());
    let known = ranking.rank_contract(&contract, &at);
    assert_eq!(known.results[0].value(), 60.0);
    assert_eq!(known.results[0].score(), 0.0);
}

#[test]
fn test_nan_total_assets_is_no_data() {
    let contract = company("NAN", "Nan Corp", "Tech", [50.0, 50.0, 50.0], [f64::NAN, 100.0, 100.0]);
    assert!(contract.balance().equity_ratio()[0].is_nan());

    let rules = build_rules(&[RuleSpec::preset(RuleKind::EquityRatio)]).unwrap();
    let ranking = Ranking::new(rules);
    let row = ranking.rank_contract(&contract, &Selection::latest());
    assert_eq!(row.results[0].flag(), RankingFlag::NoData);
    assert!(row.results[0].value().is_nan());
    assert_eq!(row.relative_score, 0.0);

    // the previous year is complete
    let row = ranking.rank_contract(&contract, &Selection::latest().with_years_back(1));
    assert_eq!(row.results[0].flag(), RankingFlag::Ok);
    assert_relative_eq!(row.results[0].value(), 50.0);
}

#[test]
fn test_no_data_is_excluded_from_relative_score() {
    let rules = build_rules(&[
        RuleSpec::preset(RuleKind::EquityRatio),
        RuleSpec::preset(RuleKind::NettoMargin),
    ])
    .unwrap();
    let ranking = Ranking::new(rules);
    // equity ratio 40% scores 2 of 2, the netto margin has no data
    let contract = company("ACME", "Acme", "Tech", [40.0; 3], [100.0; 3]);
    let row = ranking.rank_contract(&contract, &Selection::latest());
    assert_eq!(row.results[1].flag(), RankingFlag::NoData);
    assert_eq!(row.counted, 1);
    assert_eq!(row.relative_score, 1.0);
    assert_eq!(row.absolute_score(), "1/1");
    assert_eq!(row.tallies(), "1/0/2");
}

#[test]
fn test_ties_break_on_sector_then_name() {
    let equal = [20.0; 3];
    let assets = [100.0; 3];
    let contracts: Contracts = vec![
        company("ZZZ", "Zebra", "Technology", equal, assets),
        company("AAA", "Apple", "Technology", equal, assets),
        company("MMM", "Mining", "Materials", equal, assets),
        company("TOP", "Top", "Technology", [50.0; 3], assets),
    ]
    .into_iter()
    .collect();

    let ranking = Ranking::new(build_rules(&[RuleSpec::preset(RuleKind::EquityRatio)]).unwrap());
    let table = ranking.rank(&contracts, &Selection::latest());
    assert_eq!(table.tickers(), vec!["TOP", "MMM", "AAA", "ZZZ"]);
    assert_eq!(table.row("AAA").unwrap().relative_score, 0.5);

    let stats = table.rule_stats("Equity Ratio").unwrap();
    assert_eq!(stats.histogram(), vec![0, 3, 1]);
}

#[test]
fn test_reordering_rules_reorders_columns_only() {
    let contract = company("ACME", "Acme", "Tech", [40.0; 3], [100.0; 3]);
    let forward = Ranking::new(
        build_rules(&[RuleSpec::preset(RuleKind::EquityRatio), RuleSpec::preset(RuleKind::Gearing)]).unwrap(),
    );
    let backward = Ranking::new(
        build_rules(&[RuleSpec::preset(RuleKind::Gearing), RuleSpec::preset(RuleKind::EquityRatio)]).unwrap(),
    );
    let a = forward.rank_contract(&contract, &Selection::latest());
    let b = backward.rank_contract(&contract, &Selection::latest());
    assert_eq!(a.relative_score, b.relative_score);
    assert_eq!(a.results[0], b.results[1]);
    assert_eq!(forward.find_index("Gearing").unwrap(), 1);
}
