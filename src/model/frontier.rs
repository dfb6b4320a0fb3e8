use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use super::address::Address;

/// Address waiting to be crawled with its remaining hop budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub address: Address,
    pub depth: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueOrder {
    /// Breadth-first.
    #[default]
    Fifo,
    /// Depth-first.
    Lifo,
}

/// Persistent crawl progress: pending frontier, completed addresses and the
/// addresses whose history was only partially fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlState {
    pub queue: VecDeque<FrontierEntry>,
    pub completed: BTreeSet<Address>,
    #[serde(default)]
    pub partial: BTreeSet<Address>,
    #[serde(skip)]
    pending: HashMap<Address, Pending>,
}

/// Queued entries for one address and the largest budget among them.
#[derive(Debug, Clone, Copy)]
struct Pending {
    depth: u32,
    entries: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the pending index after deserialization.
    pub fn rebuild_pending(&mut self) {
        self.pending.clear();
        for entry in &self.queue {
            let pending = self.pending.entry(entry.address.clone()).or_insert(Pending {
                depth: entry.depth,
                entries: 0,
            });
            pending.depth = pending.depth.max(entry.depth);
            pending.entries += 1;
        }
    }

    fn ensure_pending(&mut self) {
        if self.pending.is_empty() && !self.queue.is_empty() {
            self.rebuild_pending();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_completed(
        &self,
        address: &Address,
    ) -> bool {
        self.completed.contains(address)
    }

    /// Queue the roots at the mode's max depth when nothing is pending.
    pub fn seed(
        &mut self,
        roots: impl IntoIterator<Item = Address>,
        max_depth: u32,
        force: bool,
    ) -> usize {
        if !self.queue.is_empty() {
            return 0;
        }
        roots
            .into_iter()
            .filter(|root| self.enqueue(root.clone(), max_depth, force))
            .count()
    }

    /// Returns false when the address was not queued: completed and not forced,
    /// or already pending with at least the same budget.
    pub fn enqueue(
        &mut self,
        address: Address,
        depth: u32,
        force: bool,
    ) -> bool {
        if self.completed.contains(&address) && !force {
            return false;
        }
        self.ensure_pending();
        let pending = self.pending.entry(address.clone()).or_insert(Pending { depth, entries: 0 });
        if pending.entries > 0 && pending.depth >= depth {
            return false;
        }
        pending.depth = depth;
        pending.entries += 1;
        self.queue.push_back(FrontierEntry { address, depth });
        true
    }

    pub fn pop_next(
        &mut self,
        order: QueueOrder,
    ) -> Option<FrontierEntry> {
        self.ensure_pending();
        let entry = match order {
            QueueOrder::Fifo => self.queue.pop_front(),
            QueueOrder::Lifo => self.queue.pop_back(),
        }?;

        // The recorded depth stays the maximum while duplicates remain: the
        // address is crawled with at least that budget before they are popped.
        if let Some(pending) = self.pending.get_mut(&entry.address) {
            pending.entries = pending.entries.saturating_sub(1);
            if pending.entries == 0 {
                self.pending.remove(&entry.address);
            }
        }
        Some(entry)
    }

    pub fn mark_completed(
        &mut self,
        address: Address,
        partial: bool,
    ) {
        if partial {
            self.partial.insert(address.clone());
        } else {
            self.partial.remove(&address);
        }
        self.completed.insert(address);
    }
}
