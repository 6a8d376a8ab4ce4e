//! Ticker universes.
//!
//! A universe is the list of tickers a run covers. Its [`UniverseConfig`]
//! drops ignored tickers and maps share classes that are reported under
//! another ticker to the ticker whose documents hold their data.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Trait for ticker universes.
pub trait Universe {
    /// Tickers of the universe, in run order.
    fn symbols(&self) -> Vec<String>;

    /// Check if a ticker is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().iter().any(|s| s == symbol)
    }

    /// Get the number of tickers.
    fn size(&self) -> usize {
        self.symbols().len()
    }

    /// Ticker whose documents describe `symbol`.
    fn source_ticker(&self, symbol: &str) -> String {
        symbol.to_string()
    }
}

/// Ignore and alias tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Tickers that are never loaded.
    pub ignore: BTreeSet<String>,
    /// Share classes of one company: alias ticker to the ticker reporting
    /// the statements.
    pub same_company: BTreeMap<String, String>,
    /// Tickers listed under a different symbol at the data source.
    pub alternative: BTreeMap<String, String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            ignore: BTreeSet::new(),
            same_company: [("BRK.B", "BRK A"), ("GOOG", "GOOGL"), ("FOX", "FOXA"), ("NWS", "NWSA")]
                .into_iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            alternative: BTreeMap::from([("BF.B".to_string(), "BF B".to_string())]),
        }
    }
}

impl UniverseConfig {
    /// Tables without any entries.
    pub const fn empty() -> Self {
        Self {
            ignore: BTreeSet::new(),
            same_company: BTreeMap::new(),
            alternative: BTreeMap::new(),
        }
    }

    /// Whether a ticker is ignored.
    pub fn is_ignored(&self, ticker: &str) -> bool {
        self.ignore.contains(ticker)
    }

    /// Ticker under which the documents of `ticker` are stored. Same-company
    /// aliases apply first, then alternative symbols.
    pub fn resolve<'a>(&'a self, ticker: &'a str) -> &'a str {
        let ticker = self.same_company.get(ticker).map_or(ticker, String::as_str);
        self.alternative.get(ticker).map_or(ticker, String::as_str)
    }
}

/// Ticker list with its tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerUniverse {
    tickers: Vec<String>,
    config: UniverseConfig,
}

impl TickerUniverse {
    /// Create a universe. Tickers are trimmed, upper-cased and deduplicated
    /// in first-seen order.
    pub fn new<S: AsRef<str>>(tickers: impl IntoIterator<Item = S>, config: UniverseConfig) -> Self {
        let mut seen = BTreeSet::new();
        let tickers = tickers
            .into_iter()
            .map(|t| t.as_ref().trim().to_uppercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        Self { tickers, config }
    }

    /// Every ticker, ignored ones included.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Tables of the universe.
    pub const fn config(&self) -> &UniverseConfig {
        &self.config
    }
}

impl Universe for TickerUniverse {
    fn symbols(&self) -> Vec<String> {
        self.tickers
            .iter()
            .filter(|t| !self.config.is_ignored(t))
            .cloned()
            .collect()
    }

    fn source_ticker(&self, symbol: &str) -> String {
        self.config.resolve(symbol).to_string()
    }
}

/// File-name stem of a ticker: spaces become dots.
pub fn file_stem(ticker: &str) -> String {
    ticker.replace(' ', ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("GOOG", "GOOGL")]
    #[case("BRK.B", "BRK A")]
    #[case("BF.B", "BF B")]
    #[case("AAPL", "AAPL")]
    fn test_resolve(#[case] ticker: &str, #[case] expected: &str) {
        assert_eq!(UniverseConfig::default().resolve(ticker), expected);
    }

    #[test]
    fn test_universe_trait() {
        let mut config = UniverseConfig::default();
        config.ignore.insert("IGN".to_string());
        let universe = TickerUniverse::new(["aapl", "GOOG", "AAPL", " ", "IGN"], config);

        assert_eq!(universe.tickers(), &["AAPL", "GOOG", "IGN"]);
        assert_eq!(universe.symbols(), vec!["AAPL", "GOOG"]);
        assert!(universe.contains("GOOG"));
        assert!(!universe.contains("IGN"));
        assert_eq!(universe.size(), 2);
        assert_eq!(universe.source_ticker("GOOG"), "GOOGL");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("BRK A"), "BRK.A");
        assert_eq!(file_stem("MSFT"), "MSFT");
    }

    #[test]
    fn test_config_json_defaults() {
        let config: UniverseConfig = serde_json::from_str(r#"{"ignore": ["XYZ"]}"#).unwrap();
        assert!(config.is_ignored("XYZ"));
        assert_eq!(config.resolve("FOX"), "FOXA");
        assert!(UniverseConfig::empty().same_company.is_empty());
    }
}
