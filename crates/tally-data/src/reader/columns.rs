//! Column header parsing for tabular reports.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static MONTH_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})")
        .expect("valid date regex")
});

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid date regex"));

static PERIOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(months?|weeks?)\s+ended").expect("valid period regex")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Date contained in a column header, if any.
pub(crate) fn header_date(header: &str) -> Option<NaiveDate> {
    if let Some(caps) = MONTH_DATE_RE.captures(header) {
        let month = caps[1].to_lowercase();
        let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    let caps = ISO_DATE_RE.captures(header)?;
    NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
}

/// Whether a header marks a period shorter than a fiscal year
/// ("3 Months Ended", "13 Weeks Ended").
pub(crate) fn is_interim(header: &str) -> bool {
    PERIOD_RE.captures(header).is_some_and(|caps| {
        let length: u32 = caps[1].parse().unwrap_or(0);
        if caps[2].to_lowercase().starts_with("week") {
            !(52..=53).contains(&length)
        } else {
            length != 12
        }
    })
}
