#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod overview;
pub mod report;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, format_cell, ranking_header};
pub use overview::{ContractOverview, OverviewRow};
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{BacktestSummary, RankedContract, RankingSummary};

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
