use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_DESTINATIONS;
use crate::constants::DEFAULT_ROOTS;
use crate::model::Address;
use crate::model::DestinationRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletsConfig {
    pub roots: Vec<String>,
    // address -> exchange label
    pub destinations: BTreeMap<String, String>,
}

impl Default for WalletsConfig {
    fn default() -> Self {
        Self {
            roots: DEFAULT_ROOTS.iter().map(|root| root.to_string()).collect(),
            destinations: DEFAULT_DESTINATIONS
                .iter()
                .map(|(address, label)| (address.to_string(), label.to_string()))
                .collect(),
        }
    }
}

impl WalletsConfig {
    pub fn root_set(&self) -> BTreeSet<Address> {
        self.roots.iter().map(|root| Address::new(root.trim())).collect()
    }

    /// Roots in configured order, without duplicates.
    pub fn ordered_roots(&self) -> Vec<Address> {
        let mut seen = BTreeSet::new();
        self.roots
            .iter()
            .map(|root| Address::new(root.trim()))
            .filter(|root| seen.insert(root.clone()))
            .collect()
    }

    pub fn registry(&self) -> DestinationRegistry {
        DestinationRegistry::from_pairs(
            self.destinations
                .iter()
                .map(|(address, label)| (Address::new(address.trim()), label.clone())),
        )
    }

    pub fn overlapping(&self) -> Option<Address> {
        let registry = self.registry();
        self.root_set().into_iter().find(|root| registry.contains(root))
    }
}
