use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::model::Address;
use crate::model::AddressFlowTable;

/// recipient -> direct funders, built from the inbound side of every table.
#[derive(Debug, Clone, Default)]
pub struct ReverseFundingIndex {
    funders: HashMap<Address, BTreeSet<Address>>,
}

impl ReverseFundingIndex {
    pub fn build<'a>(tables: impl IntoIterator<Item = &'a AddressFlowTable>) -> Self {
        let mut index = Self::default();
        for table in tables {
            index.add_table(table);
        }
        index
    }

    pub fn add_table(
        &mut self,
        table: &AddressFlowTable,
    ) {
        for edge in table.inbound().filter(|edge| !edge.sender.is_unknown()) {
            self.funders
                .entry(table.owner.clone())
                .or_default()
                .insert(edge.sender.clone());
        }
    }

    pub fn funders_of(
        &self,
        address: &Address,
    ) -> impl Iterator<Item = &Address> {
        self.funders.get(address).into_iter().flatten()
    }

    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.funders.keys()
    }

    pub fn len(&self) -> usize {
        self.funders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funders.is_empty()
    }
}
