#![allow(dead_code)]

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use athar::config::Config;
use athar::config::LedgerConfig;
use athar::error::LedgerError;
use athar::model::Address;
use athar::model::RawInput;
use athar::model::RawOutput;
use athar::model::RawTransaction;
use athar::pipeline::datasource::LedgerApi;
use athar::pipeline::datasource::PageResult;
use tokio_util::sync::CancellationToken;

pub const ROOT: &str = "root";
pub const EXCHANGE: &str = "cex";
pub const EXCHANGE_LABEL: &str = "EX";

/// Block times start here so every transfer sits before the default cursor.
pub const BASE_TIME_MS: i64 = 1_700_000_000_000;
pub const CURSOR_MS: i64 = 1_800_000_000_000;

/// One-input, one-output transfer whose sender is resolvable without lookups.
pub fn transfer(
    tx_id: &str,
    offset: i64,
    from: &str,
    to: &str,
    amount: u64,
) -> RawTransaction {
    RawTransaction {
        transaction_id: tx_id.to_string(),
        block_time: Some(BASE_TIME_MS + offset),
        inputs: vec![RawInput {
            previous_outpoint_hash: Some(format!("prev-{}", tx_id)),
            previous_outpoint_index: Some(0),
            previous_outpoint_address: Some(from.to_string()),
            previous_outpoint_amount: Some(amount),
        }],
        outputs: vec![RawOutput {
            index: Some(0),
            amount,
            script_public_key_address: Some(to.to_string()),
        }],
    }
}

#[derive(Default)]
struct LedgerState {
    histories: HashMap<String, Vec<RawTransaction>>,
    transactions: HashMap<String, RawTransaction>,
    page_fetches: BTreeMap<String, usize>,
    crawl_order: Vec<String>,
    failing: HashSet<String>,
    cancel_on: Option<(String, CancellationToken)>,
}

/// In-memory ledger: every transfer shows up in the history of each address it
/// touches, newest first, paged on `before`.
pub struct FakeLedger {
    page_size: usize,
    state: Mutex<LedgerState>,
}

impl FakeLedger {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn with_transfer(
        self,
        tx: RawTransaction,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut touched: Vec<String> = tx
                .inputs
                .iter()
                .filter_map(|input| input.previous_outpoint_address.clone())
                .chain(tx.outputs.iter().filter_map(|output| output.script_public_key_address.clone()))
                .collect();
            touched.sort();
            touched.dedup();
            for address in touched {
                state.histories.entry(address).or_default().push(tx.clone());
            }
            state.transactions.insert(tx.transaction_id.clone(), tx);
        }
        self
    }

    /// Every page request for `address` fails with a retryable error.
    pub fn failing(
        self,
        address: &str,
    ) -> Self {
        self.state.lock().unwrap().failing.insert(address.to_string());
        self
    }

    /// Cancels `token` the first time `address` is fetched.
    pub fn cancel_when_fetching(
        &self,
        address: &str,
        token: CancellationToken,
    ) {
        self.state.lock().unwrap().cancel_on = Some((address.to_string(), token));
    }

    pub fn page_fetches(
        &self,
        address: &str,
    ) -> usize {
        self.state.lock().unwrap().page_fetches.get(address).copied().unwrap_or(0)
    }

    pub fn total_page_fetches(&self) -> usize {
        self.state.lock().unwrap().page_fetches.values().sum()
    }

    /// Addresses in the order their first page was requested.
    pub fn crawl_order(&self) -> Vec<String> {
        self.state.lock().unwrap().crawl_order.clone()
    }

    pub fn fetched_addresses(&self) -> Vec<String> {
        self.state.lock().unwrap().page_fetches.keys().cloned().collect()
    }
}

#[async_trait]
impl LedgerApi for FakeLedger {
    async fn fetch_page(
        &self,
        address: &Address,
        before_ms: i64,
    ) -> Result<PageResult, LedgerError> {
        let mut state = self.state.lock().unwrap();
        *state.page_fetches.entry(address.to_string()).or_insert(0) += 1;
        if !state.crawl_order.iter().any(|seen| seen == address.as_str()) {
            state.crawl_order.push(address.to_string());
        }

        if let Some((target, token)) = &state.cancel_on {
            if target == address.as_str() {
                token.cancel();
            }
        }

        if state.failing.contains(address.as_str()) {
            return Err(LedgerError::Transient(format!("status 503 for {}", address)));
        }

        let mut page: Vec<RawTransaction> = state
            .histories
            .get(address.as_str())
            .map(|history| {
                history
                    .iter()
                    .filter(|tx| tx.block_time.is_some_and(|t| t < before_ms))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        page.sort_by(|a, b| b.block_time.cmp(&a.block_time));
        page.truncate(self.page_size);

        if page.is_empty() {
            Ok(PageResult::EndOfHistory)
        } else {
            Ok(PageResult::Transactions(page))
        }
    }

    async fn get_transaction(
        &self,
        tx_id: &str,
    ) -> Result<Option<RawTransaction>, LedgerError> {
        Ok(self.state.lock().unwrap().transactions.get(tx_id).cloned())
    }
}

pub fn fast_ledger_config(base_url: &str) -> LedgerConfig {
    LedgerConfig {
        base_url: base_url.to_string(),
        page_size: 2,
        max_pages: None,
        max_retries: 1,
        backoff_unit_ms: 0,
        inter_page_delay_ms: 0,
        start_timestamp_ms: None,
        end_timestamp_ms: Some(CURSOR_MS),
        ..Default::default()
    }
}

/// Config rooted at `ROOT` with `EXCHANGE` as the only destination, storing
/// tables under `data_dir`.
pub fn test_config(
    data_dir: &Path,
    max_depth: u32,
) -> Config {
    let mut config = Config::default();
    config.ledger = fast_ledger_config("http://127.0.0.1:1");
    config.tracer.max_depth = Some(max_depth);
    config.tracer.data_dir = Some(data_dir.display().to_string());
    config.wallets.roots = vec![ROOT.to_string()];
    config.wallets.destinations = BTreeMap::from([(EXCHANGE.to_string(), EXCHANGE_LABEL.to_string())]);
    config
}

pub fn read_dir_sorted(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
        .map(|path| (path.file_name().unwrap().to_string_lossy().to_string(), std::fs::read(&path).unwrap()))
        .collect();
    files.sort();
    files
}
