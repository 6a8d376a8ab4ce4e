//! Reporting units.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MONETARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s*in\s+(thousands|millions|billions)").expect("valid unit regex")
});

static GENERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bin\s+(thousands|millions|billions)").expect("valid unit regex")
});

/// Unit in which a report states its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Raw amounts.
    #[default]
    Units,
    /// Thousands.
    Thousands,
    /// Millions.
    Millions,
    /// Billions.
    Billions,
}

impl Unit {
    /// Detect the unit from caption text. A `$ in ...` marker wins over a
    /// generic `in ...` marker, which usually refers to share counts.
    pub fn detect(text: &str) -> Self {
        MONETARY_RE
            .captures(text)
            .or_else(|| GENERIC_RE.captures(text))
            .map_or(Self::Units, |caps| match caps[1].to_lowercase().as_str() {
                "thousands" => Self::Thousands,
                "millions" => Self::Millions,
                _ => Self::Billions,
            })
    }

    /// Factor converting a value in this unit to millions.
    pub const fn to_millions(self) -> f64 {
        match self {
            Self::Units => 1e-6,
            Self::Thousands => 1e-3,
            Self::Millions => 1.0,
            Self::Billions => 1e3,
        }
    }
}
