//! Integration tests for label resolution.

use tally_data::{DataError, LabelResolver, ResolutionConfig, ResolutionTable, StatementKind};

fn revenue_table(config: &ResolutionConfig) -> &ResolutionTable {
    config
        .field_tables(StatementKind::Income)
        .find(|(name, _)| *name == "revenue")
        .map(|(_, table)| table)
        .unwrap()
}

#[test]
fn test_resolution_is_deterministic() {
    let config = ResolutionConfig::default();
    let resolver = LabelResolver::new("revenue", revenue_table(&config));
    let labels = [("Total revenues", true), ("Revenues", true), ("Cost of revenues", true)];

    let first = resolver.resolve(Some("ACME"), labels).unwrap();
    for _ in 0..10 {
        assert_eq!(resolver.resolve(Some("ACME"), labels).unwrap(), first);
    }
    assert_eq!(first, "Total revenues");
}

#[test]
fn test_combination_order_decides_outcome() {
    let labels = [("Net sales", true), ("Total", true)];

    let forward = ResolutionTable::new(["net sales", "total"], vec![vec!["net sales", "total"]]);
    let reversed = ResolutionTable::new(["net sales", "total"], vec![vec!["total", "net sales"]]);

    assert_eq!(LabelResolver::new("revenue", &forward).resolve(None, labels).unwrap(), "Net sales");
    assert_eq!(LabelResolver::new("revenue", &reversed).resolve(None, labels).unwrap(), "Total");
}

#[test]
fn test_ticker_override_beats_generic_rule() {
    let table = ResolutionTable::new(["net sales", "total"], vec![vec!["total", "net sales"]])
        .with_ticker_combinations("grmn", vec![vec!["net sales", "total"]]);
    let resolver = LabelResolver::new("revenue", &table);
    let labels = [("Net sales", true), ("Total", true)];

    assert_eq!(resolver.resolve(Some("GRMN"), labels).unwrap(), "Net sales");
    assert_eq!(resolver.resolve(Some("AME"), labels).unwrap(), "Total");
}

#[test]
fn test_ambiguity_lists_every_candidate() {
    let config = ResolutionConfig::default();
    let resolver = LabelResolver::new("revenue", revenue_table(&config));
    let labels = [("Net sales", true), ("Sales", true), ("Rental income", true)];

    match resolver.resolve(Some("ACME"), labels) {
        Err(DataError::AmbiguousLabel { field, ticker, candidates }) => {
            assert_eq!(field, "revenue");
            assert_eq!(ticker.as_deref(), Some("ACME"));
            assert_eq!(candidates, vec!["Net sales", "Sales", "Rental income"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_missing_label() {
    let config = ResolutionConfig::default();
    let resolver = LabelResolver::new("revenue", revenue_table(&config));
    let err = resolver.resolve(None, [("Cost of sales", true), ("Revenues", false)]).unwrap_err();
    assert!(err.is_resolution_failure());
    assert!(matches!(err, DataError::LabelNotFound { ticker: None, .. }));
}

#[test]
fn test_config_from_json_extends_defaults() {
    let json = r#"{
        "fields": {
            "income": {
                "revenue": {
                    "known": ["turnover"],
                    "combinations": [["turnover", "revenues"]]
                }
            }
        }
    }"#;
    let extra: ResolutionConfig = serde_json::from_str(json).unwrap();
    assert!(extra.sheet_table(StatementKind::Income).is_none());

    let mut config = ResolutionConfig::default();
    config.merge(extra);
    let table = revenue_table(&config);
    assert!(table.is_known("Turnover"));
    assert!(table.is_known("total revenues"));

    let resolver = LabelResolver::new("revenue", table);
    let labels = [("Revenues", true), ("Turnover", true)];
    assert_eq!(resolver.resolve(None, labels).unwrap(), "Turnover");
}
