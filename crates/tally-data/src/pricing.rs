//! Daily price history.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day.
    pub date: NaiveDate,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

impl PriceBar {
    /// Bar with the same open, high, low and close.
    pub const fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Daily OHLCV history in ascending date order.
///
/// The bars live in a `DataFrame` with columns `date` (ISO string), `open`,
/// `high`, `low`, `close` and `volume`.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    frame: DataFrame,
    dates: Vec<NaiveDate>,
}

impl PriceHistory {
    /// Build a history from bars; bars are sorted and later duplicates of a
    /// day replace earlier ones.
    pub fn from_bars(bars: Vec<PriceBar>) -> Result<Self> {
        let by_date: BTreeMap<NaiveDate, PriceBar> = bars.into_iter().map(|b| (b.date, b)).collect();
        let bars: Vec<PriceBar> = by_date.into_values().collect();

        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let date_strings: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        let frame = DataFrame::new(vec![
            Series::new("date".into(), date_strings).into(),
            Series::new("open".into(), bars.iter().map(|b| b.open).collect::<Vec<_>>()).into(),
            Series::new("high".into(), bars.iter().map(|b| b.high).collect::<Vec<_>>()).into(),
            Series::new("low".into(), bars.iter().map(|b| b.low).collect::<Vec<_>>()).into(),
            Series::new("close".into(), bars.iter().map(|b| b.close).collect::<Vec<_>>()).into(),
            Series::new("volume".into(), bars.iter().map(|b| b.volume).collect::<Vec<_>>()).into(),
        ])?;
        Ok(Self { frame, dates })
    }

    /// Read a delimited price file with a header row containing at least
    /// `date` and `close` (case-insensitive); missing OHLV columns copy the close.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let date_idx = position("date")
            .or_else(|| if headers.first().is_some_and(String::is_empty) { Some(0) } else { None })
            .ok_or_else(|| DataError::Parse("price file has no date column".to_string()))?;
        let close_idx = position("close")
            .ok_or_else(|| DataError::Parse("price file has no close column".to_string()))?;
        let (open_idx, high_idx, low_idx, volume_idx) =
            (position("open"), position("high"), position("low"), position("volume"));

        let mut bars = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let date = parse_date(record.get(date_idx).unwrap_or_default())?;
            let number = |idx: Option<usize>| -> Option<f64> {
                idx.and_then(|i| record.get(i)).and_then(|s| s.trim().parse().ok())
            };
            let Some(close) = number(Some(close_idx)) else {
                continue;
            };
            bars.push(PriceBar {
                date,
                open: number(open_idx).unwrap_or(close),
                high: number(high_idx).unwrap_or(close),
                low: number(low_idx).unwrap_or(close),
                close,
                volume: number(volume_idx).unwrap_or(0.0),
            });
        }
        Self::from_bars(bars)
    }

    /// Read a tab-separated price file.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_csv_reader(std::fs::File::open(path)?, b'\t')
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the history has no bars.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Trading days in ascending order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Last trading day.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Close prices in ascending date order.
    pub fn closes(&self) -> Result<Vec<f64>> {
        Ok(self
            .frame
            .column("close")?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    fn close_at(&self, index: usize) -> Result<Option<f64>> {
        Ok(self.frame.column("close")?.f64()?.get(index))
    }

    /// Close of the last trading day on or before `date`.
    pub fn close_on_or_before(&self, date: NaiveDate) -> Result<Option<f64>> {
        match self.dates.partition_point(|d| *d <= date) {
            0 => Ok(None),
            n => self.close_at(n - 1),
        }
    }

    /// Most recent close.
    pub fn latest_close(&self) -> Result<Option<f64>> {
        match self.dates.len() {
            0 => Ok(None),
            n => self.close_at(n - 1),
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| DataError::InvalidDate(raw.to_string()))
}

/// Source of daily price histories.
pub trait PriceProvider {
    /// History of a ticker, `None` when the provider has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to load the data.
    fn price_history(&self, ticker: &str) -> Result<Option<PriceHistory>>;
}

impl PriceProvider for BTreeMap<String, PriceHistory> {
    fn price_history(&self, ticker: &str) -> Result<Option<PriceHistory>> {
        Ok(self.get(ticker).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_from_bars_sorts_and_dedupes() {
        let history = PriceHistory::from_bars(vec![
            PriceBar::flat(day(3), 12.0),
            PriceBar::flat(day(1), 10.0),
            PriceBar::flat(day(3), 13.0),
        ])
        .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.dates(), &[day(1), day(3)]);
        assert_eq!(history.closes().unwrap(), vec![10.0, 13.0]);
        assert_eq!(history.frame().height(), 2);
    }

    #[test]
    fn test_close_on_or_before() {
        let history = PriceHistory::from_bars(vec![
            PriceBar::flat(day(2), 10.0),
            PriceBar::flat(day(5), 11.0),
        ])
        .unwrap();
        assert_eq!(history.close_on_or_before(day(1)).unwrap(), None);
        assert_eq!(history.close_on_or_before(day(2)).unwrap(), Some(10.0));
        assert_eq!(history.close_on_or_before(day(4)).unwrap(), Some(10.0));
        assert_eq!(history.close_on_or_before(day(9)).unwrap(), Some(11.0));
        assert_eq!(history.latest_close().unwrap(), Some(11.0));
    }

    #[test]
    fn test_from_tab_separated() {
        let data = "date\topen\thigh\tlow\tclose\tvolume\n\
                    2024-01-02\t1\t2\t0.5\t1.5\t100\n\
                    2024-01-03 00:00:00\t1.5\t2\t1\t1.8\t200\n";
        let history = PriceHistory::from_csv_reader(data.as_bytes(), b'\t').unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last_date(), Some(day(3)));
        assert_eq!(history.latest_close().unwrap(), Some(1.8));
    }

    #[test]
    fn test_missing_close_column() {
        let data = "date,open\n2024-01-02,1\n";
        assert!(PriceHistory::from_csv_reader(data.as_bytes(), b',').is_err());
    }

    #[test]
    fn test_empty_history() {
        let history = PriceHistory::from_bars(Vec::new()).unwrap();
        assert!(history.is_empty());
        assert_eq!(history.latest_close().unwrap(), None);
    }
}
