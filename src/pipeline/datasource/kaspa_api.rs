use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::LedgerConfig;
use crate::err_with_loc;
use crate::error::LedgerError;
use crate::model::Address;
use crate::model::RawTransaction;
use crate::utils::calculate_backoff_with_jitter;
use crate::utils::now_millis;

/// One page of an address history.
#[derive(Debug, Clone, PartialEq)]
pub enum PageResult {
    Transactions(Vec<RawTransaction>),
    /// Empty page, non-list body or unparseable body.
    EndOfHistory,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Up to one page of transactions with block time strictly before `before_ms`.
    async fn fetch_page(
        &self,
        address: &Address,
        before_ms: i64,
    ) -> Result<PageResult, LedgerError>;

    /// `Ok(None)` when the ledger does not know the transaction.
    async fn get_transaction(
        &self,
        tx_id: &str,
    ) -> Result<Option<RawTransaction>, LedgerError>;
}

pub struct KaspaApiClient {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
    resolve_previous_outpoints: bool,
}

impl KaspaApiClient {
    pub fn new(config: &LedgerConfig) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| err_with_loc!(LedgerError::Request(e.to_string())))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            resolve_previous_outpoints: config.resolve_previous_outpoints,
        })
    }

    fn page_query(
        &self,
        before_ms: i64,
    ) -> Vec<(&'static str, String)> {
        let mut query = vec![("limit", self.page_size.to_string()), ("before", before_ms.to_string())];
        if self.resolve_previous_outpoints {
            query.push(("after", "0".to_string()));
            query.push(("resolve_previous_outpoints", "full".to_string()));
            query.push(("acceptance", "accepted".to_string()));
        }
        query
    }

    async fn get_body(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), LedgerError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(LedgerError::Transient(format!("status {} for {}", status.as_u16(), url)));
        }

        let body = response.text().await.map_err(|e| LedgerError::Transient(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl LedgerApi for KaspaApiClient {
    async fn fetch_page(
        &self,
        address: &Address,
        before_ms: i64,
    ) -> Result<PageResult, LedgerError> {
        let url = format!("{}/addresses/{}/full-transactions-page", self.base_url, address);
        let request = self.client.get(&url).query(&self.page_query(before_ms));

        let (status, body) = self.get_body(request).await?;
        if !status.is_success() {
            return Err(LedgerError::Rejected { status: status.as_u16(), url });
        }

        #[cfg(feature = "deep-trace")]
        debug!("page_payload::address::{}::before::{}::body::{}", address, before_ms, body);

        Ok(parse_page(address, &body))
    }

    async fn get_transaction(
        &self,
        tx_id: &str,
    ) -> Result<Option<RawTransaction>, LedgerError> {
        let url = format!("{}/transactions/{}", self.base_url, tx_id);
        let (status, body) = self.get_body(self.client.get(&url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LedgerError::Rejected { status: status.as_u16(), url });
        }

        serde_json::from_str::<RawTransaction>(&body)
            .map(Some)
            .map_err(|e| LedgerError::Decode(format!("transaction {}: {}", tx_id, e)))
    }
}

fn parse_page(
    address: &Address,
    body: &str,
) -> PageResult {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("malformed_page_response::address::{}::error::{}", address, e);
            return PageResult::EndOfHistory;
        },
    };

    let Value::Array(items) = value else {
        debug!("non_list_page_response::address::{}", address);
        return PageResult::EndOfHistory;
    };

    if items.is_empty() {
        return PageResult::EndOfHistory;
    }

    let transactions = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawTransaction>(item) {
            Ok(tx) => Some(tx),
            Err(e) => {
                warn!("skipping_undecodable_transaction::address::{}::error::{}", address, e);
                None
            },
        })
        .collect();

    PageResult::Transactions(transactions)
}

/// Every transaction fetched for one address, oldest pages last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedHistory {
    pub transactions: Vec<RawTransaction>,
    pub pages: usize,
    /// False when a page failed after exhausting its retries.
    pub complete: bool,
}

async fn fetch_page_with_retry<A>(
    api: &A,
    address: &Address,
    before_ms: i64,
    config: &LedgerConfig,
) -> Result<PageResult, LedgerError>
where
    A: LedgerApi + ?Sized,
{
    let inter_page_delay = Duration::from_millis(config.inter_page_delay_ms);
    let mut retry_count: usize = 0;

    loop {
        let result = api.fetch_page(address, before_ms).await;
        tokio::time::sleep(inter_page_delay).await;

        match result {
            Ok(page) => return Ok(page),
            Err(e) if e.is_transient() && retry_count < config.max_retries => {
                retry_count += 1;
                let backoff_delay = calculate_backoff_with_jitter(
                    retry_count as u32,
                    config.backoff_base,
                    config.backoff_unit_ms,
                    config.max_backoff_ms,
                    config.backoff_jitter,
                );
                warn!(
                    "retrying_page_fetch::address::{}::before::{}::attempt::{}::delay_ms::{}::error::{}",
                    address,
                    before_ms,
                    retry_count,
                    backoff_delay.as_millis(),
                    e
                );
                tokio::time::sleep(backoff_delay).await;
            },
            Err(e) => return Err(e),
        }
    }
}

/// Walks an address history backward in time, page by page, until the ledger
/// runs out, the start bound is crossed or the cursor stalls. A page that keeps
/// failing, or an optional `max_pages` cap, ends the walk with `complete = false`.
pub async fn fetch_history<A>(
    api: &A,
    address: &Address,
    config: &LedgerConfig,
) -> FetchedHistory
where
    A: LedgerApi + ?Sized,
{
    let start = config.start_timestamp_ms;
    let mut before = config.end_timestamp_ms.unwrap_or_else(now_millis);
    let mut history = FetchedHistory {
        complete: true,
        ..Default::default()
    };

    loop {
        if let Some(max_pages) = config.max_pages {
            if history.pages >= max_pages {
                // End of history was never observed, so the table may be short.
                warn!(
                    "max_pages_reached::address::{}::pages::{}::fetched::{}::marking_partial",
                    address,
                    history.pages,
                    history.transactions.len()
                );
                history.complete = false;
                break;
            }
        }

        debug!("fetching_page::address::{}::before::{}", address, before);
        let page = fetch_page_with_retry(api, address, before, config).await;
        history.pages += 1;

        let transactions = match page {
            Ok(PageResult::Transactions(transactions)) => transactions,
            Ok(PageResult::EndOfHistory) => {
                debug!("end_of_history::address::{}", address);
                break;
            },
            Err(e) => {
                error!(
                    "page_fetch_failed::address::{}::before::{}::fetched::{}::error::{}",
                    address,
                    before,
                    history.transactions.len(),
                    e
                );
                history.complete = false;
                break;
            },
        };

        let oldest = transactions.iter().filter_map(|tx| tx.block_time).min();
        history.transactions.extend(
            transactions
                .into_iter()
                .filter(|tx| match (start, tx.block_time) {
                    (Some(start), Some(block_time)) => block_time >= start,
                    _ => true,
                }),
        );

        match oldest {
            Some(oldest) if oldest < before => before = oldest,
            _ => {
                debug!("cursor_not_advancing::address::{}::before::{}", address, before);
                break;
            },
        }

        if let Some(start) = start {
            if before < start {
                debug!("start_bound_reached::address::{}::before::{}", address, before);
                break;
            }
        }
    }

    info!(
        "history_fetched::address::{}::transactions::{}::pages::{}::complete::{}",
        address,
        history.transactions.len(),
        history.pages,
        history.complete
    );
    history
}
