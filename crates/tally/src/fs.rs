//! File-system document source.
//!
//! Layout under the data directory:
//!
//! - `fin_statements/<TICKER>_fin_statements.xml`: brokerage exports
//! - `sec-edgar-filings/<TICKER>/*.json`: SEC reports as `RawReport` JSON
//! - `basic_info.csv`: descriptive data, one row per ticker
//! - `prices/<TICKER>_daily_prices.csv`: tab-separated daily prices
//!
//! Tickers with spaces are stored with dots (`BRK A` as `BRK.A`).

use crate::pipeline::{DocumentSource, Filing};
use crate::universe::file_stem;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tally_data::{ContractInfo, PriceHistory, PriceProvider};
use tracing::{debug, info};

/// Directory of the brokerage exports.
pub const FIN_STATEMENTS_DIR: &str = "fin_statements";
/// Directory of the SEC filings.
pub const FILINGS_DIR: &str = "sec-edgar-filings";
/// Descriptive data file.
pub const BASIC_INFO_FILE: &str = "basic_info.csv";
/// Directory of the price files.
pub const PRICES_DIR: &str = "prices";

const FIN_STATEMENTS_SUFFIX: &str = "_fin_statements.xml";
const PRICES_SUFFIX: &str = "_daily_prices.csv";

#[derive(Debug, Deserialize)]
struct BasicInfoRecord {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Long Name", default)]
    long_name: String,
    #[serde(rename = "Sector", default)]
    sector: String,
    #[serde(rename = "Price", default, deserialize_with = "csv::invalid_option")]
    price: Option<f64>,
    #[serde(rename = "Trailing PE", default, deserialize_with = "csv::invalid_option")]
    trailing_pe: Option<f64>,
    #[serde(rename = "Forward PE", default, deserialize_with = "csv::invalid_option")]
    forward_pe: Option<f64>,
    #[serde(rename = "Market Cap", default, deserialize_with = "csv::invalid_option")]
    market_cap: Option<f64>,
    #[serde(rename = "Dividend Yield", default, deserialize_with = "csv::invalid_option")]
    dividend_yield: Option<f64>,
    #[serde(rename = "Payout Ratio", default, deserialize_with = "csv::invalid_option")]
    payout_ratio: Option<f64>,
}

impl From<BasicInfoRecord> for ContractInfo {
    fn from(record: BasicInfoRecord) -> Self {
        let number = |value: Option<f64>| value.unwrap_or(f64::NAN);
        Self {
            long_name: record.long_name,
            sector: record.sector,
            price: number(record.price),
            trailing_pe: number(record.trailing_pe),
            forward_pe: number(record.forward_pe),
            market_cap: number(record.market_cap),
            dividend_yield: number(record.dividend_yield),
            payout_ratio: number(record.payout_ratio),
        }
    }
}

/// Read descriptive data, in file order. Unparsable numbers are NaN.
///
/// # Errors
///
/// Returns an error for malformed CSV or rows without a ticker column.
pub fn read_basic_info<R: Read>(reader: R) -> tally_data::Result<Vec<(String, ContractInfo)>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize::<BasicInfoRecord>() {
        let record = record?;
        if record.ticker.is_empty() {
            continue;
        }
        rows.push((record.ticker.clone(), ContractInfo::from(record)));
    }
    Ok(rows)
}

/// Documents and prices stored in a data directory.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
    info: BTreeMap<String, ContractInfo>,
    info_order: Vec<String>,
}

impl FsDocumentSource {
    /// Open a data directory and read its descriptive data. A missing
    /// `basic_info.csv` leaves every contract without descriptive data.
    ///
    /// # Errors
    ///
    /// Returns an error if `basic_info.csv` exists but cannot be read.
    pub fn open(root: impl Into<PathBuf>) -> tally_data::Result<Self> {
        let root = root.into();
        let path = root.join(BASIC_INFO_FILE);
        let rows = if path.exists() {
            read_basic_info(std::fs::File::open(&path)?)?
        } else {
            debug!(path = %path.display(), "no descriptive data");
            Vec::new()
        };
        info!(root = %root.display(), tickers = rows.len(), "data directory opened");
        let info_order = rows.iter().map(|(t, _)| t.clone()).collect();
        Ok(Self {
            root,
            info: rows.into_iter().collect(),
            info_order,
        })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the brokerage export of a ticker.
    pub fn brokerage_path(&self, ticker: &str) -> PathBuf {
        self.root
            .join(FIN_STATEMENTS_DIR)
            .join(format!("{}{FIN_STATEMENTS_SUFFIX}", file_stem(ticker)))
    }

    /// Directory of the filings of a ticker.
    pub fn filings_dir(&self, ticker: &str) -> PathBuf {
        self.root.join(FILINGS_DIR).join(file_stem(ticker))
    }

    /// Path of the price file of a ticker.
    pub fn price_path(&self, ticker: &str) -> PathBuf {
        self.root
            .join(PRICES_DIR)
            .join(format!("{}{PRICES_SUFFIX}", file_stem(ticker)))
    }

    /// JSON filings of a ticker, sorted by file name. A missing directory has
    /// no filings.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub fn filing_paths(&self, ticker: &str) -> std::io::Result<Vec<PathBuf>> {
        let dir = self.filings_dir(ticker);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Tickers of the data directory: those of `basic_info.csv` in file
    /// order, then those with only a brokerage export.
    ///
    /// # Errors
    ///
    /// Returns an error if the export directory cannot be listed.
    pub fn tickers(&self) -> std::io::Result<Vec<String>> {
        let mut tickers = self.info_order.clone();
        let known: BTreeSet<String> = tickers.iter().map(|t| file_stem(t)).collect();
        let dir = self.root.join(FIN_STATEMENTS_DIR);
        if dir.is_dir() {
            let mut exported = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let name = entry?.file_name();
                if let Some(ticker) = name.to_str().and_then(|n| n.strip_suffix(FIN_STATEMENTS_SUFFIX))
                    && !known.contains(ticker)
                {
                    exported.push(ticker.to_string());
                }
            }
            exported.sort();
            tickers.extend(exported);
        }
        Ok(tickers)
    }

    /// Descriptive data read when the directory was opened.
    pub fn info(&self, ticker: &str) -> Option<&ContractInfo> {
        self.info.get(ticker)
    }
}

impl DocumentSource for FsDocumentSource {
    fn brokerage_xml(&self, ticker: &str) -> tally_data::Result<Option<String>> {
        let path = self.brokerage_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn filings(&self, ticker: &str) -> tally_data::Result<Vec<Filing>> {
        self.filing_paths(ticker)?
            .into_iter()
            .map(|path| {
                Ok(Filing {
                    json: std::fs::read_to_string(&path)?,
                    source: path.display().to_string(),
                })
            })
            .collect()
    }

    fn contract_info(&self, ticker: &str) -> tally_data::Result<Option<ContractInfo>> {
        Ok(self.info(ticker).cloned())
    }
}

impl PriceProvider for FsDocumentSource {
    fn price_history(&self, ticker: &str) -> tally_data::Result<Option<PriceHistory>> {
        let path = self.price_path(ticker);
        if !path.exists() {
            return Ok(None);
        }
        PriceHistory::from_path(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_basic_info() {
        let csv = "Ticker,Long Name,Sector,Price,Trailing PE,Forward PE,Market Cap,Dividend Yield,Payout Ratio\n\
                   AAPL,Apple Inc.,Technology,190.5,30.1,28,2900000000000,0.005,0.15\n\
                   XYZ,Xyz Corp,Utilities,,N/A,,,,\n\
                   ,, ,,,,,,\n";
        let rows = read_basic_info(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "AAPL");
        assert_eq!(rows[0].1.long_name, "Apple Inc.");
        assert_eq!(rows[0].1.price, 190.5);
        assert_eq!(rows[1].1.sector, "Utilities");
        assert!(rows[1].1.price.is_nan());
        assert!(rows[1].1.trailing_pe.is_nan());
    }

    #[test]
    fn test_layout_paths() {
        let source = FsDocumentSource {
            root: PathBuf::from("/data"),
            info: BTreeMap::new(),
            info_order: Vec::new(),
        };
        assert_eq!(
            source.brokerage_path("BRK A"),
            PathBuf::from("/data/fin_statements/BRK.A_fin_statements.xml")
        );
        assert_eq!(source.filings_dir("MSFT"), PathBuf::from("/data/sec-edgar-filings/MSFT"));
        assert_eq!(source.price_path("SPX"), PathBuf::from("/data/prices/SPX_daily_prices.csv"));
    }
}
