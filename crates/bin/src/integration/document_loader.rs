//! Concurrent loading of ticker documents from a data directory.
//!
//! Files are read with tokio; the texts are handed to the synchronous
//! pipeline afterwards.

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tally::{Filing, FsDocumentSource, TickerDocuments, TickerError, TickerUniverse, Universe};
use tracing::warn;

/// Default number of concurrent ticker loads.
const DEFAULT_CONCURRENCY: usize = 10;

/// Load the documents of every ticker of a universe, in universe order.
pub(crate) async fn load_universe(
    source: &FsDocumentSource,
    universe: &TickerUniverse,
    progress: Option<&ProgressBar>,
) -> Vec<TickerDocuments> {
    let symbols = universe.symbols();
    if let Some(pb) = progress {
        pb.set_length(symbols.len() as u64);
        pb.set_message(format!(
            "Loading {} tickers ({} concurrent)...",
            symbols.len(),
            DEFAULT_CONCURRENCY
        ));
    }

    let mut loaded: Vec<(usize, TickerDocuments)> = stream::iter(symbols.into_iter().enumerate())
        .map(|(index, ticker)| async move {
            let source_ticker = universe.source_ticker(&ticker);
            (index, load_ticker(source, &ticker, &source_ticker).await)
        })
        .buffer_unordered(DEFAULT_CONCURRENCY)
        .inspect(|_| {
            if let Some(pb) = progress {
                pb.inc(1);
            }
        })
        .collect()
        .await;

    loaded.sort_by_key(|(index, _)| *index);
    loaded.into_iter().map(|(_, documents)| documents).collect()
}

async fn load_ticker(source: &FsDocumentSource, ticker: &str, source_ticker: &str) -> TickerDocuments {
    let mut documents = TickerDocuments {
        ticker: ticker.to_string(),
        info: source.info(ticker).cloned(),
        ..TickerDocuments::default()
    };
    let mut fail = |document: String, message: String| {
        warn!(ticker, document = %document, message = %message, "document unreadable");
        documents.errors.push(TickerError {
            ticker: ticker.to_string(),
            document,
            message,
        });
    };

    let path = source.brokerage_path(source_ticker);
    let mut brokerage_xml = None;
    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        match tokio::fs::read_to_string(&path).await {
            Ok(xml) => brokerage_xml = Some(xml),
            Err(e) => fail(path.display().to_string(), e.to_string()),
        }
    }

    let mut filings = Vec::new();
    match source.filing_paths(source_ticker) {
        Ok(paths) => {
            for path in paths {
                match tokio::fs::read_to_string(&path).await {
                    Ok(json) => filings.push(Filing {
                        source: path.display().to_string(),
                        json,
                    }),
                    Err(e) => fail(path.display().to_string(), e.to_string()),
                }
            }
        }
        Err(e) => fail(source.filings_dir(source_ticker).display().to_string(), e.to_string()),
    }

    documents.brokerage_xml = brokerage_xml;
    documents.filings = filings;
    documents
}
