#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod fs;
pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use tally_data as data;
pub use tally_output as output;
pub use tally_ranking as ranking;

pub use config::{TallyConfig, default_data_dir};
pub use error::TallyError;
pub use fs::FsDocumentSource;
pub use pipeline::{
    BatchOutcome, DocumentSource, Filing, Pipeline, TickerDocuments, TickerError, attach_prices,
    load_documents,
};
pub use universe::{TickerUniverse, Universe, UniverseConfig};

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
