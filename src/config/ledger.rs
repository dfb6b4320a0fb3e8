use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_BACKOFF_BASE;
use crate::constants::DEFAULT_BACKOFF_UNIT_MS;
use crate::constants::DEFAULT_INTER_PAGE_DELAY_MS;
use crate::constants::DEFAULT_MAX_BACKOFF_MS;
use crate::constants::DEFAULT_MAX_PREVIOUS_LOOKUPS;
use crate::constants::DEFAULT_MAX_RETRIES;
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::constants::DEFAULT_PREVIOUS_OUTPUT_DEPTH;
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::constants::DEFAULT_START_TIMESTAMP_MS;
use crate::constants::FULL_HISTORY_PAGE_SIZE;
use crate::constants::FULL_HISTORY_REQUEST_TIMEOUT_MS;
use crate::constants::KASPA_API_BASE_URL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub base_url: String,
    pub page_size: usize,
    // Optional per-address cap; a capped walk is recorded as partial
    pub max_pages: Option<usize>,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
    pub backoff_base: u64,
    pub backoff_unit_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_jitter: f64,
    pub inter_page_delay_ms: u64,
    // Transactions older than this are never fetched
    pub start_timestamp_ms: Option<i64>,
    // Initial `before` cursor; now when unset
    pub end_timestamp_ms: Option<i64>,
    pub resolve_previous_outpoints: bool,
    pub previous_output_depth: u32,
    pub max_previous_lookups: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_url: KASPA_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_unit_ms: DEFAULT_BACKOFF_UNIT_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            backoff_jitter: 0.0,
            inter_page_delay_ms: DEFAULT_INTER_PAGE_DELAY_MS,
            start_timestamp_ms: Some(DEFAULT_START_TIMESTAMP_MS),
            end_timestamp_ms: None,
            resolve_previous_outpoints: false,
            previous_output_depth: DEFAULT_PREVIOUS_OUTPUT_DEPTH,
            max_previous_lookups: DEFAULT_MAX_PREVIOUS_LOOKUPS,
        }
    }
}

impl LedgerConfig {
    /// Preset for the non-recursive full-history export.
    pub fn full_history(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            page_size: FULL_HISTORY_PAGE_SIZE,
            max_pages: None,
            request_timeout_ms: FULL_HISTORY_REQUEST_TIMEOUT_MS,
            start_timestamp_ms: None,
            resolve_previous_outpoints: true,
            ..Self::default()
        }
    }
}
