#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tally/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod brokerage;
pub mod contract;
pub mod error;
pub mod pricing;
pub mod reader;
pub mod resolution;
pub mod statement;

pub use aggregate::{ContractAggregator, StatementAlignmentWarning, TimeSeries};
pub use brokerage::{BrokeragePeriod, BrokerageReport};
pub use contract::{Contract, ContractInfo, Contracts, MetricError, Selection};
pub use error::{DataError, Result};
pub use pricing::{PriceBar, PriceHistory, PriceProvider};
pub use reader::{RawReport, RawRow, RawSheet, ReconciledRecord, StatementReader};
pub use resolution::{LabelResolver, ResolutionConfig, ResolutionTable};
pub use statement::{
    BalanceField, BalanceSheet, CashFlow, CashFlowField, CoaType, Income, IncomeField,
    LineItemField, NanPolicy, Statement, StatementKind,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
