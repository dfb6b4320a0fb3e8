use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::classifier::AttributionClassifier;
use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::AttributionResult;
use crate::model::Classification;
use crate::model::DestinationRegistry;

/// Per-recipient attribution for one classifier configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Attribution {
    results: BTreeMap<Address, AttributionResult>,
    // Roots and destinations never count as intermediaries
    #[serde(skip)]
    excluded: BTreeSet<Address>,
}

impl Attribution {
    pub fn get(
        &self,
        address: &Address,
    ) -> Option<&AttributionResult> {
        self.results.get(address)
    }

    pub fn results(&self) -> impl Iterator<Item = &AttributionResult> {
        self.results.values()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Recipients whose root-funded fraction reaches `threshold`.
    pub fn verified(
        &self,
        threshold: f64,
    ) -> BTreeSet<Address> {
        self.results
            .values()
            .filter(|result| !self.excluded.contains(&result.address) && result.passes(threshold))
            .map(|result| result.address.clone())
            .collect()
    }
}

/// Splits every table owner's inbound value by the classification of the
/// immediate funder. Unknown funders count as external.
pub fn attribute(
    tables: &[AddressFlowTable],
    classifier: &mut AttributionClassifier<'_>,
    roots: &BTreeSet<Address>,
    destinations: &DestinationRegistry,
) -> Attribution {
    let mut sums: BTreeMap<Address, (u64, u64)> = BTreeMap::new();

    for table in tables {
        let (root_reachable, external) = sums.entry(table.owner.clone()).or_insert((0, 0));
        for edge in table.inbound() {
            let classification = if edge.sender.is_unknown() {
                Classification::External
            } else {
                classifier.classify(&edge.sender)
            };
            match classification {
                Classification::RootReachable => *root_reachable = root_reachable.saturating_add(edge.amount),
                Classification::External => *external = external.saturating_add(edge.amount),
            }
        }
    }

    let results: BTreeMap<Address, AttributionResult> = sums
        .into_iter()
        .map(|(address, (root_reachable, external))| {
            (address.clone(), AttributionResult::new(address, root_reachable, external))
        })
        .collect();

    debug!("attribution_computed::recipients::{}::max_depth::{}", results.len(), classifier.max_depth());

    Attribution {
        results,
        excluded: roots.iter().cloned().chain(destinations.addresses()).collect(),
    }
}
