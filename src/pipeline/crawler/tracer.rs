use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::config::LedgerConfig;
use crate::err_with_loc;
use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::CrawlState;
use crate::model::DestinationRegistry;
use crate::model::FrontierEntry;
use crate::model::QueueOrder;
use crate::model::TableFormat;
use crate::pipeline::datasource::LedgerApi;
use crate::pipeline::datasource::fetch_history;
use crate::pipeline::processor::TransactionNormalizer;
use crate::storage::CheckpointStore;
use crate::storage::FlowTableStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracerOptions {
    pub max_depth: u32,
    pub order: QueueOrder,
    pub force: bool,
    pub reuse_existing_tables: bool,
    pub format: TableFormat,
}

/// What happened to one frontier entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOutcome {
    /// Already completed, already crawled this run, or a terminal destination.
    Skipped,
    Completed { edges: usize, enqueued: usize },
    /// Retries exhausted; whatever was fetched is written and the gap recorded.
    Partial { edges: usize, enqueued: usize },
    /// Table left by an interrupted run was read back instead of re-fetched.
    Reused { edges: usize, enqueued: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub seeded: usize,
    pub skipped: usize,
    pub completed: usize,
    pub partial: usize,
    pub reused: usize,
    pub remaining: usize,
    pub cancelled: bool,
}

impl CrawlSummary {
    fn record(
        &mut self,
        outcome: AddressOutcome,
    ) {
        match outcome {
            AddressOutcome::Skipped => self.skipped += 1,
            AddressOutcome::Completed { .. } => self.completed += 1,
            AddressOutcome::Partial { .. } => self.partial += 1,
            AddressOutcome::Reused { .. } => self.reused += 1,
        }
    }
}

/// Drains the crawl frontier one address at a time: fetch, normalize, write
/// the table, enqueue counterparties, checkpoint.
pub struct Tracer {
    api: Arc<dyn LedgerApi>,
    ledger: LedgerConfig,
    normalizer: TransactionNormalizer,
    tables: FlowTableStore,
    checkpoint: CheckpointStore,
    roots: Vec<Address>,
    destinations: DestinationRegistry,
    options: TracerOptions,
}

impl Tracer {
    pub fn new(
        api: Arc<dyn LedgerApi>,
        ledger: LedgerConfig,
        tables: FlowTableStore,
        checkpoint: CheckpointStore,
        roots: Vec<Address>,
        destinations: DestinationRegistry,
        options: TracerOptions,
    ) -> Self {
        Self {
            api,
            normalizer: TransactionNormalizer::from_config(&ledger),
            ledger,
            tables,
            checkpoint,
            roots,
            destinations,
            options,
        }
    }

    /// Wire a tracer for `config.tracer.mode`, storing tables and the
    /// checkpoint in the mode's data directory.
    pub fn from_config(
        api: Arc<dyn LedgerApi>,
        config: &Config,
    ) -> Self {
        let mode = config.tracer.mode;
        let data_dir = config.tracer.effective_data_dir();
        let destinations = config.wallets.registry();
        let options = TracerOptions {
            max_depth: config.tracer.effective_max_depth(),
            order: config.tracer.queue_order,
            force: config.tracer.force,
            reuse_existing_tables: config.tracer.reuse_existing_tables,
            format: mode.table_format(),
        };

        Self::new(
            api,
            config.ledger_for(mode),
            FlowTableStore::new(&data_dir, options.format, destinations.clone()),
            CheckpointStore::new(Path::new(&data_dir).join(config.tracer.effective_checkpoint_file())),
            config.wallets.ordered_roots(),
            destinations,
            options,
        )
    }

    pub fn options(&self) -> &TracerOptions {
        &self.options
    }

    pub fn tables(&self) -> &FlowTableStore {
        &self.tables
    }

    /// Load the checkpoint and drain the frontier.
    pub async fn resume(
        &self,
        cancellation_token: &CancellationToken,
    ) -> crate::Result<CrawlSummary> {
        let mut state = self.checkpoint.load().map_err(|e| err_with_loc!(e))?;
        self.run(&mut state, cancellation_token).await
    }

    pub async fn run(
        &self,
        state: &mut CrawlState,
        cancellation_token: &CancellationToken,
    ) -> crate::Result<CrawlSummary> {
        let mut summary = CrawlSummary {
            seeded: state.seed(self.roots.iter().cloned(), self.options.max_depth, self.options.force),
            ..Default::default()
        };
        if summary.seeded > 0 {
            info!("frontier_seeded::roots::{}::depth::{}", summary.seeded, self.options.max_depth);
            self.save(state)?;
        }

        let mut crawled: HashSet<Address> = HashSet::new();

        loop {
            if cancellation_token.is_cancelled() {
                info!("crawl_cancelled::remaining::{}", state.len());
                summary.cancelled = true;
                break;
            }

            let Some(entry) = state.pop_next(self.options.order) else {
                break;
            };

            let outcome = self.process_entry(state, &entry, &mut crawled).await?;
            summary.record(outcome);
        }

        summary.remaining = state.len();
        info!(
            "crawl_finished::completed::{}::partial::{}::reused::{}::skipped::{}::remaining::{}",
            summary.completed, summary.partial, summary.reused, summary.skipped, summary.remaining
        );
        Ok(summary)
    }

    async fn process_entry(
        &self,
        state: &mut CrawlState,
        entry: &FrontierEntry,
        crawled: &mut HashSet<Address>,
    ) -> crate::Result<AddressOutcome> {
        let address = &entry.address;

        let already_done = crawled.contains(address) || (state.is_completed(address) && !self.options.force);
        if already_done || self.destinations.contains(address) {
            debug!("skipping_address::{}::depth::{}", address, entry.depth);
            self.save(state)?;
            return Ok(AddressOutcome::Skipped);
        }

        if self.options.reuse_existing_tables && !self.options.force && self.tables.exists(address) {
            match self.tables.read(address) {
                Ok(table) => {
                    let enqueued = self.enqueue_counterparties(state, &table, entry.depth, crawled);
                    state.mark_completed(address.clone(), false);
                    self.save(state)?;
                    crawled.insert(address.clone());
                    info!("reused_flow_table::address::{}::edges::{}::enqueued::{}", address, table.len(), enqueued);
                    return Ok(AddressOutcome::Reused {
                        edges: table.len(),
                        enqueued,
                    });
                },
                Err(e) => warn!("existing_flow_table_unusable::address::{}::error::{}", address, e),
            }
        }

        info!("tracing_address::{}::depth::{}", address, entry.depth);
        let history = fetch_history(self.api.as_ref(), address, &self.ledger).await;
        let edges = self.normalizer.normalize_all(self.api.as_ref(), &history.transactions).await;
        let table = AddressFlowTable::from_edges(address.clone(), self.options.format, edges);

        // Table first, checkpoint second: a crash in between only costs a re-fetch.
        self.tables.write(&table).map_err(|e| err_with_loc!(e))?;
        let enqueued = self.enqueue_counterparties(state, &table, entry.depth, crawled);
        state.mark_completed(address.clone(), !history.complete);
        self.save(state)?;
        crawled.insert(address.clone());

        if history.complete {
            info!("address_completed::{}::edges::{}::enqueued::{}", address, table.len(), enqueued);
            Ok(AddressOutcome::Completed {
                edges: table.len(),
                enqueued,
            })
        } else {
            warn!("address_partial::{}::edges::{}::enqueued::{}", address, table.len(), enqueued);
            Ok(AddressOutcome::Partial {
                edges: table.len(),
                enqueued,
            })
        }
    }

    fn enqueue_counterparties(
        &self,
        state: &mut CrawlState,
        table: &AddressFlowTable,
        depth: u32,
        crawled: &HashSet<Address>,
    ) -> usize {
        let Some(next_depth) = depth.checked_sub(1) else {
            return 0;
        };

        table
            .counterparties()
            .into_iter()
            .filter(|counterparty| !self.destinations.contains(counterparty) && !crawled.contains(counterparty))
            .filter(|counterparty| state.enqueue(counterparty.clone(), next_depth, self.options.force))
            .count()
    }

    fn save(
        &self,
        state: &CrawlState,
    ) -> crate::Result<()> {
        self.checkpoint.save(state).map_err(|e| err_with_loc!(e))
    }
}
