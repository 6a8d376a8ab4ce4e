//! Batch construction of contracts.
//!
//! Every ticker is built independently from its documents: the brokerage
//! export sets the layout and fiscal periods, SEC filings are reconciled
//! and merged on top. A failing document is skipped and recorded as a
//! per-ticker error; the batch aborts only when the configured error budget
//! is exceeded.

use crate::config::TallyConfig;
use crate::error::TallyError;
use crate::universe::Universe;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tally_data::{
    BrokerageReport, Contract, ContractAggregator, ContractInfo, Contracts, DataError,
    PriceProvider, RawReport, ReconciledRecord, StatementAlignmentWarning, StatementKind,
    StatementReader, TimeSeries,
};
use tracing::{debug, info, warn};

/// One filing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filing {
    /// Where the document came from.
    pub source: String,
    /// `RawReport` JSON text.
    pub json: String,
}

/// Every document known for one ticker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerDocuments {
    /// Ticker of the contract to build.
    pub ticker: String,
    /// Brokerage XML export.
    pub brokerage_xml: Option<String>,
    /// SEC filings.
    pub filings: Vec<Filing>,
    /// Descriptive data.
    pub info: Option<ContractInfo>,
    /// Failures while loading the documents.
    pub errors: Vec<TickerError>,
}

/// Provider of the documents of a ticker.
pub trait DocumentSource {
    /// Brokerage XML export, `None` when there is none.
    fn brokerage_xml(&self, ticker: &str) -> tally_data::Result<Option<String>>;

    /// SEC filings, oldest first.
    fn filings(&self, ticker: &str) -> tally_data::Result<Vec<Filing>>;

    /// Descriptive data, `None` when unknown.
    fn contract_info(&self, ticker: &str) -> tally_data::Result<Option<ContractInfo>>;
}

/// A per-ticker failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerError {
    /// Ticker being built.
    pub ticker: String,
    /// Document that failed, empty for source failures.
    pub document: String,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for TickerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.document.is_empty() {
            write!(f, "{}: {}", self.ticker, self.message)
        } else {
            write!(f, "{} ({}): {}", self.ticker, self.document, self.message)
        }
    }
}

/// Result of a batch load.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Built contracts, in universe order.
    pub contracts: Contracts,
    /// Documents that failed.
    pub errors: Vec<TickerError>,
    /// Alignment warnings of the merged filings.
    pub warnings: Vec<StatementAlignmentWarning>,
    /// Tickers without any statement data.
    pub missing: Vec<DataError>,
}

impl BatchOutcome {
    /// One line per error, warning and missing ticker.
    pub fn report(&self) -> String {
        let mut lines = vec![format!(
            "{} contracts built, {} errors, {} alignment warnings, {} without data",
            self.contracts.len(),
            self.errors.len(),
            self.warnings.len(),
            self.missing.len()
        )];
        lines.extend(self.errors.iter().map(|e| format!("error: {e}")));
        lines.extend(self.warnings.iter().map(|w| format!("warning: {w}")));
        lines.extend(self.missing.iter().map(|m| format!("missing: {m}")));
        lines.join("\n")
    }
}

/// Builds contracts from documents.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    config: &'a TallyConfig,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over a configuration.
    pub const fn new(config: &'a TallyConfig) -> Self {
        Self { config }
    }

    /// Statement kinds read from filings: those with a sheet table.
    fn filing_kinds(&self) -> Vec<StatementKind> {
        self.config.resolution.sheets.keys().copied().collect()
    }

    /// Reconcile one filing into one record per statement kind.
    ///
    /// # Errors
    ///
    /// The first resolution or parse error of the document.
    pub fn read_filing(&self, filing: &Filing) -> tally_data::Result<Vec<(StatementKind, ReconciledRecord)>> {
        let mut report = RawReport::from_json(&filing.json)?;
        if report.source.is_empty() {
            report.source.clone_from(&filing.source);
        }
        let reader = StatementReader::new(&self.config.resolution);
        self.filing_kinds()
            .into_iter()
            .map(|kind| Ok((kind, reader.read_statement(&report, kind)?)))
            .collect()
    }

    /// Build one contract. Failing documents are returned as errors next to
    /// the contract built from the remaining ones.
    pub fn build_contract(
        &self,
        documents: &TickerDocuments,
    ) -> (Contract, Vec<TickerError>, Vec<StatementAlignmentWarning>) {
        let ticker = documents.ticker.as_str();
        let fail = |document: &str, error: &dyn fmt::Display| {
            warn!(ticker, document, error = %error, "document skipped");
            TickerError {
                ticker: ticker.to_string(),
                document: document.to_string(),
                message: error.to_string(),
            }
        };

        let mut contract = Contract::new(ticker);
        if let Some(info) = &documents.info {
            contract = contract.with_info(info.clone());
        }
        let mut errors = documents.errors.clone();
        let mut warnings = Vec::new();

        if let Some(xml) = &documents.brokerage_xml
            && let Err(e) = BrokerageReport::parse(xml).and_then(|r| r.populate(&mut contract))
        {
            errors.push(fail("brokerage export", &e));
        }

        let mut records: BTreeMap<StatementKind, Vec<ReconciledRecord>> = BTreeMap::new();
        for filing in &documents.filings {
            match self.read_filing(filing) {
                Ok(read) => {
                    for (kind, record) in read {
                        records.entry(kind).or_default().push(record);
                    }
                }
                Err(e) => errors.push(fail(&filing.source, &e)),
            }
        }
        for (kind, records) in records {
            let series = TimeSeries::stitch(records);
            match ContractAggregator::merge(&mut contract, kind, &series) {
                Ok(w) => warnings.extend(w),
                Err(e) => errors.push(fail(&format!("{kind} filings"), &e)),
            }
        }

        debug!(ticker, periods = contract.fiscal_years().len(), errors = errors.len(), "contract built");
        (contract, errors, warnings)
    }

    /// Build contracts from documents loaded elsewhere.
    ///
    /// # Errors
    ///
    /// [`TallyError::ErrorBudgetExceeded`] once more per-ticker errors were
    /// collected than `max_errors` allows.
    pub fn assemble(
        &self,
        documents: impl IntoIterator<Item = TickerDocuments>,
    ) -> Result<BatchOutcome, TallyError> {
        let mut outcome = BatchOutcome::default();
        for documents in documents {
            let (contract, errors, warnings) = self.build_contract(&documents);
            outcome.errors.extend(errors);
            outcome.warnings.extend(warnings);
            self.check_budget(&outcome.errors)?;

            if contract.has_no_statements() {
                let missing = DataError::MissingTickerData {
                    ticker: documents.ticker.clone(),
                    reason: "no statement data".to_string(),
                };
                warn!("{missing}");
                outcome.missing.push(missing);
                continue;
            }
            outcome.contracts.insert(contract);
        }
        info!(
            contracts = outcome.contracts.len(),
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            missing = outcome.missing.len(),
            "batch load finished"
        );
        Ok(outcome)
    }

    /// Load and build every ticker of a universe.
    ///
    /// # Errors
    ///
    /// See [`Self::assemble`].
    pub fn run(
        &self,
        universe: &impl Universe,
        source: &dyn DocumentSource,
    ) -> Result<BatchOutcome, TallyError> {
        let documents = universe
            .symbols()
            .into_iter()
            .map(|ticker| load_documents(source, &ticker, &universe.source_ticker(&ticker)));
        self.assemble(documents)
    }

    fn check_budget(&self, errors: &[TickerError]) -> Result<(), TallyError> {
        match self.config.max_errors {
            Some(max) if errors.len() > max => Err(TallyError::ErrorBudgetExceeded {
                max,
                errors: errors.iter().map(ToString::to_string).collect(),
            }),
            _ => Ok(()),
        }
    }
}

/// Load the documents of `ticker` stored under `source_ticker`. A source
/// failure leaves the affected documents empty and is recorded in
/// [`TickerDocuments::errors`].
pub fn load_documents(source: &dyn DocumentSource, ticker: &str, source_ticker: &str) -> TickerDocuments {
    let mut errors = Vec::new();
    let mut record = |error: DataError| {
        warn!(ticker, source_ticker, error = %error, "document source failed");
        errors.push(TickerError {
            ticker: ticker.to_string(),
            document: String::new(),
            message: error.to_string(),
        });
    };

    let brokerage_xml = source.brokerage_xml(source_ticker).unwrap_or_else(|e| {
        record(e);
        None
    });
    let filings = source.filings(source_ticker).unwrap_or_else(|e| {
        record(e);
        Vec::new()
    });
    let info = source.contract_info(ticker).unwrap_or_else(|e| {
        record(e);
        None
    });
    TickerDocuments {
        ticker: ticker.to_string(),
        brokerage_xml,
        filings,
        info,
        errors,
    }
}

/// Attach price histories to contracts that have none. Missing or failing
/// histories are logged and left empty.
pub fn attach_prices(contracts: &mut Contracts, prices: &dyn PriceProvider) -> usize {
    let mut attached = 0;
    for contract in contracts.iter_mut().filter(|c| c.pricing().is_none()) {
        match prices.price_history(contract.ticker()) {
            Ok(Some(history)) => {
                contract.set_pricing(Some(history));
                attached += 1;
            }
            Ok(None) => debug!(ticker = contract.ticker(), "no price history"),
            Err(e) => warn!(ticker = contract.ticker(), error = %e, "price history unavailable"),
        }
    }
    attached
}
