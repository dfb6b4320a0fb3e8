use std::collections::HashMap;

use tracing::debug;
use tracing::warn;

use crate::config::LedgerConfig;
use crate::model::Address;
use crate::model::FlowEdge;
use crate::model::RawTransaction;
use crate::pipeline::datasource::LedgerApi;
use crate::utils::block_time_to_utc;

/// Turns raw ledger transactions into flow edges under the single-sender
/// approximation: the sender is the address behind the first resolvable input.
#[derive(Debug, Clone, Copy)]
pub struct TransactionNormalizer {
    previous_output_depth: u32,
    max_previous_lookups: usize,
}

impl TransactionNormalizer {
    pub fn new(
        previous_output_depth: u32,
        max_previous_lookups: usize,
    ) -> Self {
        Self {
            previous_output_depth,
            max_previous_lookups,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.previous_output_depth, config.max_previous_lookups)
    }

    pub async fn normalize<A>(
        &self,
        api: &A,
        tx: &RawTransaction,
    ) -> Vec<FlowEdge>
    where
        A: LedgerApi + ?Sized,
    {
        let sender = self.resolve_sender(api, tx).await;
        let timestamp = block_time_to_utc(tx.block_time);

        tx.outputs
            .iter()
            .filter_map(|output| {
                let recipient = output.script_public_key_address.as_deref().filter(|a| !a.is_empty())?;
                Some(FlowEdge {
                    tx_id: tx.transaction_id.clone(),
                    timestamp,
                    sender: sender.clone(),
                    recipient: Address::new(recipient),
                    amount: output.amount,
                })
            })
            .collect()
    }

    pub async fn normalize_all<A>(
        &self,
        api: &A,
        transactions: &[RawTransaction],
    ) -> Vec<FlowEdge>
    where
        A: LedgerApi + ?Sized,
    {
        let mut edges = Vec::new();
        for tx in transactions {
            edges.extend(self.normalize(api, tx).await);
        }
        edges
    }

    async fn resolve_sender<A>(
        &self,
        api: &A,
        tx: &RawTransaction,
    ) -> Address
    where
        A: LedgerApi + ?Sized,
    {
        let direct = tx
            .inputs
            .iter()
            .find_map(|input| input.previous_outpoint_address.as_deref().filter(|a| !a.is_empty()));
        if let Some(address) = direct {
            return Address::new(address);
        }

        if self.previous_output_depth == 0 {
            return Address::unknown();
        }

        // (previous tx hash, output index, level); inputs pushed in reverse so
        // the first input is tried first.
        let mut stack: Vec<(String, u32, u32)> = tx
            .inputs
            .iter()
            .rev()
            .filter_map(|input| {
                let hash = input.previous_outpoint_hash.clone()?;
                Some((hash, input.previous_outpoint_index.unwrap_or(0), 1))
            })
            .collect();

        let mut fetched: HashMap<String, Option<RawTransaction>> = HashMap::new();
        let mut lookups = 0usize;

        while let Some((hash, index, level)) = stack.pop() {
            if !fetched.contains_key(&hash) {
                // Out of budget: skip uncached outpoints but keep trying cached ones.
                if lookups >= self.max_previous_lookups {
                    debug!("previous_lookup_budget_exhausted::tx::{}::skipping::{}", tx.transaction_id, hash);
                    continue;
                }
                lookups += 1;
                let previous = match api.get_transaction(&hash).await {
                    Ok(previous) => previous,
                    Err(e) => {
                        warn!("previous_tx_lookup_failed::tx::{}::previous::{}::error::{}", tx.transaction_id, hash, e);
                        None
                    },
                };
                fetched.insert(hash.clone(), previous);
            }

            let Some(Some(previous)) = fetched.get(&hash) else {
                continue;
            };

            let resolved = previous
                .output_at(index)
                .and_then(|output| output.script_public_key_address.as_deref())
                .filter(|a| !a.is_empty());
            if let Some(address) = resolved {
                return Address::new(address);
            }

            if level < self.previous_output_depth {
                let deeper: Vec<(String, u32, u32)> = previous
                    .inputs
                    .iter()
                    .rev()
                    .filter_map(|input| {
                        let hash = input.previous_outpoint_hash.clone()?;
                        Some((hash, input.previous_outpoint_index.unwrap_or(0), level + 1))
                    })
                    .collect();
                stack.extend(deeper);
            }
        }

        debug!("sender_unresolved::tx::{}", tx.transaction_id);
        Address::unknown()
    }
}
