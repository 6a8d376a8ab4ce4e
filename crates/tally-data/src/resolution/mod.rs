//! Label resolution.
//!
//! Financial filings name the same line item in many ways ("Revenues", "Net
//! sales", "Total revenues and other income") and frequently show several of
//! them at once. A [`ResolutionTable`] lists the known synonyms of one field
//! plus priority-ordered combination rules; [`LabelResolver`] uses it to pick
//! exactly one label from a document or to fail with the full candidate set.
//!
//! The same machinery resolves sheet names in multi-sheet reports.

mod defaults;

use crate::error::{DataError, Result};
use crate::statement::StatementKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Comparison form of a label: trimmed and lower-cased.
pub(crate) fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Synonyms and combination rules for one canonical field.
///
/// Labels are compared case-insensitively after trimming. Combination rules
/// are checked in declaration order, per-ticker overrides before the generic
/// list; the first element of the first matching rule is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableSpec")]
pub struct ResolutionTable {
    known: BTreeSet<String>,
    combinations: Vec<Vec<String>>,
    ticker_combinations: BTreeMap<String, Vec<Vec<String>>>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct TableSpec {
    known: Vec<String>,
    combinations: Vec<Vec<String>>,
    ticker_combinations: BTreeMap<String, Vec<Vec<String>>>,
}

impl From<TableSpec> for ResolutionTable {
    fn from(spec: TableSpec) -> Self {
        let mut table = Self::new(spec.known, spec.combinations);
        for (ticker, combinations) in spec.ticker_combinations {
            table = table.with_ticker_combinations(&ticker, combinations);
        }
        table
    }
}

impl ResolutionTable {
    /// Create a table from known labels and generic combination rules.
    pub fn new<S: AsRef<str>>(
        known: impl IntoIterator<Item = S>,
        combinations: impl IntoIterator<Item = Vec<S>>,
    ) -> Self {
        Self {
            known: known.into_iter().map(|s| normalize(s.as_ref())).collect(),
            combinations: combinations
                .into_iter()
                .map(|c| c.iter().map(|s| normalize(s.as_ref())).collect())
                .collect(),
            ticker_combinations: BTreeMap::new(),
        }
    }

    /// Add combination rules that apply to one ticker only.
    pub fn with_ticker_combinations<S: AsRef<str>>(
        mut self,
        ticker: &str,
        combinations: impl IntoIterator<Item = Vec<S>>,
    ) -> Self {
        let entry = self
            .ticker_combinations
            .entry(ticker.trim().to_uppercase())
            .or_default();
        entry.extend(
            combinations
                .into_iter()
                .map(|c| c.iter().map(|s| normalize(s.as_ref())).collect()),
        );
        self
    }

    /// Whether a label is a known synonym.
    pub fn is_known(&self, label: &str) -> bool {
        self.known.contains(&normalize(label))
    }

    /// Generic combination rules in priority order.
    pub fn combinations(&self) -> &[Vec<String>] {
        &self.combinations
    }

    /// Combination rules for a ticker, if any.
    pub fn ticker_combinations(&self, ticker: &str) -> Option<&[Vec<String>]> {
        self.ticker_combinations
            .get(&ticker.trim().to_uppercase())
            .map(Vec::as_slice)
    }

    /// Merge another table into this one: synonyms are unioned, the other
    /// table's combinations take priority. Rules present in both are kept
    /// once, at the other table's position.
    pub fn extend(&mut self, other: Self) {
        self.known.extend(other.known);
        self.combinations = prepend_rules(other.combinations, std::mem::take(&mut self.combinations));
        for (ticker, rules) in other.ticker_combinations {
            let entry = self.ticker_combinations.entry(ticker).or_default();
            *entry = prepend_rules(rules, std::mem::take(entry));
        }
    }
}

fn prepend_rules(mut first: Vec<Vec<String>>, rest: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for rule in rest {
        if !first.contains(&rule) {
            first.push(rule);
        }
    }
    first
}

/// Resolves the label of one canonical field from the labels of a document.
#[derive(Debug, Clone, Copy)]
pub struct LabelResolver<'a> {
    field: &'a str,
    table: &'a ResolutionTable,
}

impl<'a> LabelResolver<'a> {
    /// Create a resolver for `field` backed by `table`.
    pub const fn new(field: &'a str, table: &'a ResolutionTable) -> Self {
        Self { field, table }
    }

    /// Pick one label.
    ///
    /// `labels` yields each document label together with whether its row
    /// carries at least one numeric value. The label is returned with the
    /// document's own spelling.
    ///
    /// # Errors
    ///
    /// [`DataError::LabelNotFound`] when no known label carries data and
    /// [`DataError::AmbiguousLabel`] when several do and no combination rule
    /// matches them.
    pub fn resolve<'l>(
        &self,
        ticker: Option<&str>,
        labels: impl IntoIterator<Item = (&'l str, bool)>,
    ) -> Result<&'l str> {
        let mut candidates: Vec<(&'l str, String)> = Vec::new();
        for (label, has_data) in labels {
            if !has_data {
                continue;
            }
            let normalized = normalize(label);
            if self.table.known.contains(&normalized)
                && !candidates.iter().any(|(_, n)| *n == normalized)
            {
                candidates.push((label, normalized));
            }
        }

        match candidates.len() {
            0 => Err(DataError::LabelNotFound {
                field: self.field.to_string(),
                ticker: ticker.map(str::to_string),
            }),
            1 => Ok(candidates[0].0),
            _ => {
                let mut present: Vec<&str> = candidates.iter().map(|(_, n)| n.as_str()).collect();
                present.sort_unstable();

                let overrides = ticker
                    .and_then(|t| self.table.ticker_combinations(t))
                    .unwrap_or_default();
                let chosen = overrides
                    .iter()
                    .chain(&self.table.combinations)
                    .find(|combination| {
                        let mut rule: Vec<&str> = combination.iter().map(String::as_str).collect();
                        rule.sort_unstable();
                        rule == present
                    })
                    .and_then(|combination| combination.first());

                match chosen.and_then(|c| candidates.iter().find(|(_, n)| n == c)) {
                    Some((label, _)) => {
                        debug!(field = self.field, ?ticker, label, "resolved by combination rule");
                        Ok(*label)
                    }
                    None => Err(DataError::AmbiguousLabel {
                        field: self.field.to_string(),
                        ticker: ticker.map(str::to_string),
                        candidates: candidates.iter().map(|(l, _)| (*l).to_string()).collect(),
                    }),
                }
            }
        }
    }
}

/// Resolution tables for sheets and fields of every statement kind.
///
/// Deserialized configurations hold only the tables they name; merge them
/// into [`ResolutionConfig::default`] to extend the built-in tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Sheet-name tables, one per statement kind.
    #[serde(default)]
    pub sheets: BTreeMap<StatementKind, ResolutionTable>,
    /// Field tables keyed by statement kind, then canonical field name.
    #[serde(default)]
    pub fields: BTreeMap<StatementKind, BTreeMap<String, ResolutionTable>>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(
            StatementKind::Income,
            BTreeMap::from([
                ("revenue".to_string(), defaults::revenue()),
                ("net_income".to_string(), defaults::net_income()),
            ]),
        );
        Self {
            sheets: BTreeMap::from([(StatementKind::Income, defaults::income_sheets())]),
            fields,
        }
    }
}

impl ResolutionConfig {
    /// Configuration without any tables.
    pub const fn empty() -> Self {
        Self {
            sheets: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Sheet-name table of a statement kind.
    pub fn sheet_table(&self, kind: StatementKind) -> Option<&ResolutionTable> {
        self.sheets.get(&kind)
    }

    /// Field tables of a statement kind, in field-name order.
    pub fn field_tables(
        &self,
        kind: StatementKind,
    ) -> impl Iterator<Item = (&str, &ResolutionTable)> + '_ {
        self.fields
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|(name, table)| (name.as_str(), table))
    }

    /// Merge another configuration; tables present in both are extended.
    pub fn merge(&mut self, other: Self) {
        for (kind, table) in other.sheets {
            self.sheets.entry(kind).or_default().extend(table);
        }
        for (kind, tables) in other.fields {
            let target = self.fields.entry(kind).or_default();
            for (name, table) in tables {
                target.entry(name).or_default().extend(table);
            }
        }
    }
}
