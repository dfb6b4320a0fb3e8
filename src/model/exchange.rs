use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use super::address::Address;

/// Known terminal wallets (exchange deposit addresses) and their labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationRegistry {
    wallets: BTreeMap<Address, String>,
}

impl DestinationRegistry {
    pub fn new(wallets: BTreeMap<Address, String>) -> Self {
        Self { wallets }
    }

    pub fn from_pairs<A, L>(pairs: impl IntoIterator<Item = (A, L)>) -> Self
    where
        A: Into<Address>,
        L: Into<String>,
    {
        Self {
            wallets: pairs
                .into_iter()
                .map(|(address, label)| (address.into(), label.into()))
                .collect(),
        }
    }

    pub fn label_of(
        &self,
        address: &Address,
    ) -> Option<&str> {
        self.wallets.get(address).map(String::as_str)
    }

    pub fn contains(
        &self,
        address: &Address,
    ) -> bool {
        self.wallets.contains_key(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &str)> {
        self.wallets.iter().map(|(address, label)| (address, label.as_str()))
    }

    pub fn addresses(&self) -> BTreeSet<Address> {
        self.wallets.keys().cloned().collect()
    }

    pub fn labels(&self) -> BTreeSet<&str> {
        self.wallets.values().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
