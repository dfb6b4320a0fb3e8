use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use super::reverse_index::ReverseFundingIndex;
use crate::model::Address;
use crate::model::Classification;

/// Answers "does value reach this address from a root within `max_depth`
/// backward funding hops?". Results are memoized for the classifier's
/// lifetime, so roots and depth are fixed at construction.
pub struct AttributionClassifier<'a> {
    roots: &'a BTreeSet<Address>,
    index: &'a ReverseFundingIndex,
    max_depth: u32,
    cache: HashMap<Address, Classification>,
}

impl<'a> AttributionClassifier<'a> {
    pub fn new(
        roots: &'a BTreeSet<Address>,
        index: &'a ReverseFundingIndex,
        max_depth: u32,
    ) -> Self {
        Self {
            roots,
            index,
            max_depth,
            cache: HashMap::new(),
        }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn classify(
        &mut self,
        address: &Address,
    ) -> Classification {
        if let Some(&cached) = self.cache.get(address) {
            return cached;
        }
        let classification = self.search(address);
        self.cache.insert(address.clone(), classification);
        classification
    }

    // Roots are tested when dequeued; nodes at max_depth are not expanded.
    fn search(
        &self,
        address: &Address,
    ) -> Classification {
        let mut queue: VecDeque<(&Address, u32)> = VecDeque::from([(address, 0)]);
        let mut visited: HashSet<&Address> = HashSet::new();

        while let Some((current, depth)) = queue.pop_front() {
            if self.roots.contains(current) {
                return Classification::RootReachable;
            }
            if depth >= self.max_depth || !visited.insert(current) {
                continue;
            }
            for funder in self.index.funders_of(current) {
                queue.push_back((funder, depth + 1));
            }
        }

        Classification::External
    }
}
