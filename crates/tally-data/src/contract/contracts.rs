use super::Contract;
use std::collections::HashMap;

/// Contracts keyed by ticker, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Contracts {
    items: Vec<Contract>,
    index: HashMap<String, usize>,
}

impl Contracts {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a contract; a contract with the same ticker is replaced in place
    /// and returned.
    pub fn insert(&mut self, contract: Contract) -> Option<Contract> {
        match self.index.get(contract.ticker()) {
            Some(&i) => Some(std::mem::replace(&mut self.items[i], contract)),
            None => {
                self.index
                    .insert(contract.ticker().to_string(), self.items.len());
                self.items.push(contract);
                None
            }
        }
    }

    /// Contract by ticker.
    pub fn get(&self, ticker: &str) -> Option<&Contract> {
        self.index.get(ticker).map(|&i| &self.items[i])
    }

    /// Mutable contract by ticker.
    pub fn get_mut(&mut self, ticker: &str) -> Option<&mut Contract> {
        self.index.get(ticker).map(|&i| &mut self.items[i])
    }

    /// Whether a ticker is present.
    pub fn contains(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    /// Number of contracts.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tickers in insertion order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(Contract::ticker)
    }

    /// Contracts in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contract> {
        self.items.iter()
    }

    /// Mutable contracts in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Contract> {
        self.items.iter_mut()
    }
}

impl FromIterator<Contract> for Contracts {
    fn from_iter<I: IntoIterator<Item = Contract>>(iter: I) -> Self {
        let mut contracts = Self::new();
        for contract in iter {
            contracts.insert(contract);
        }
        contracts
    }
}

impl Extend<Contract> for Contracts {
    fn extend<I: IntoIterator<Item = Contract>>(&mut self, iter: I) {
        for contract in iter {
            self.insert(contract);
        }
    }
}

impl IntoIterator for Contracts {
    type Item = Contract;
    type IntoIter = std::vec::IntoIter<Contract>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Contracts {
    type Item = &'a Contract;
    type IntoIter = std::slice::Iter<'a, Contract>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
