//! Run configuration.
//!
//! A [`TallyConfig`] is read from a JSON file. Every key is optional and
//! falls back to the built-in tables and presets.

use crate::error::TallyError;
use crate::universe::UniverseConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_data::ResolutionConfig;
use tally_ranking::{BacktestConfig, FilterSpec, Ranking, RuleSpec, ScreenFilter, build_rules, default_specs};

/// Name of the data directory under the platform data directory.
pub const DATA_DIR_NAME: &str = "tally";

/// Configuration of a tally run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Label resolution tables. Tables read from JSON extend the built-in
    /// ones unless `replace_resolution` is set.
    pub resolution: ResolutionConfig,
    /// Use the configured resolution tables instead of the built-in ones.
    pub replace_resolution: bool,
    /// Ignore and alias tables.
    pub universe: UniverseConfig,
    /// Ranking rules, in column order.
    pub rules: Vec<RuleSpec>,
    /// Screening filters, applied in order.
    pub screen: Vec<FilterSpec>,
    /// Backtest settings.
    pub backtest: BacktestConfig,
    /// Per-ticker errors tolerated by a batch load, unlimited when `None`.
    pub max_errors: Option<usize>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            resolution: ResolutionConfig::default(),
            replace_resolution: false,
            universe: UniverseConfig::default(),
            rules: default_specs(),
            screen: Vec::new(),
            backtest: BacktestConfig::default(),
            max_errors: None,
        }
    }
}

impl TallyConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, TallyError> {
        let mut config: Self = serde_json::from_str(json)?;
        if !config.replace_resolution {
            let mut resolution = ResolutionConfig::default();
            resolution.merge(std::mem::replace(&mut config.resolution, ResolutionConfig::empty()));
            config.resolution = resolution;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, TallyError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Configuration as pretty JSON.
    pub fn to_json(&self) -> Result<String, TallyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), TallyError> {
        if self.rules.is_empty() {
            return Err(TallyError::Config("at least one rule is required".to_string()));
        }
        if self.backtest.window_days <= 0 {
            return Err(TallyError::Config(format!(
                "backtest window must be positive, got {} days",
                self.backtest.window_days
            )));
        }
        Ok(())
    }

    /// Build the configured ranking.
    pub fn ranking(&self) -> Result<Ranking, TallyError> {
        Ok(Ranking::new(build_rules(&self.rules)?))
    }

    /// Build the configured screening filters.
    pub fn filters(&self) -> Result<Vec<ScreenFilter>, TallyError> {
        Ok(self
            .screen
            .iter()
            .map(FilterSpec::build)
            .collect::<Result<_, _>>()?)
    }
}

/// Default data directory, `<platform data dir>/tally`.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(DATA_DIR_NAME))
}
