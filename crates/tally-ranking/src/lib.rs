#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod backtest;
pub mod error;
pub mod metrics;
pub mod presets;
pub mod ranking;
pub mod registry;
pub mod result;
pub mod rule;
pub mod screener;

pub use backtest::{BackTester, BacktestConfig, BacktestReport, BenchmarkReturn, Period, Snapshot};
pub use error::{RankingError, Result, RuleEvaluationError};
pub use presets::{DEFAULT_GROWTH_YEARS, RuleKind, RuleSpec, build_rules, default_rules, default_specs};
pub use ranking::{Ranking, RankingRow, RankingTable, RuleStats};
pub use registry::{RuleCategory, RuleInfo, available_rules, get_rule_info};
pub use result::{RankingFlag, RankingResult};
pub use rule::{Accessor, Comparison, Constraint, RangeRankingObject, RankingObject};
pub use screener::{
    EqualityFilter, FilterOutcome, FilterSpec, LimitFilter, ScreenFilter, ScreenResult, ScreenValue,
    Screener,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
