pub mod kaspa_api;

pub use kaspa_api::fetch_history;
pub use kaspa_api::FetchedHistory;
pub use kaspa_api::KaspaApiClient;
pub use kaspa_api::LedgerApi;
pub use kaspa_api::PageResult;
