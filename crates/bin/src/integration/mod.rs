//! Glue between the data directory and the tally pipeline.

pub(crate) mod document_loader;
