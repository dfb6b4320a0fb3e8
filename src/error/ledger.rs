use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Connect failures, timeouts, HTTP 429 and 5xx. Retried with backoff.
    #[error("Transient ledger error: {0}")]
    Transient(String),

    /// Any other rejection by the ledger API. Ends the fetch for the address.
    #[error("Ledger request rejected with status {status}: {url}")]
    Rejected { status: u16, url: String },

    #[error("Failed to build ledger request: {0}")]
    Request(String),

    #[error("Failed to decode ledger response: {0}")]
    Decode(String),
}

impl LedgerError {
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Transient(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            return LedgerError::Transient(e.to_string());
        }
        match e.status() {
            Some(status) if status.as_u16() == 429 || status.is_server_error() => {
                LedgerError::Transient(e.to_string())
            },
            Some(status) => LedgerError::Rejected {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None if e.is_decode() || e.is_body() => LedgerError::Decode(e.to_string()),
            None => LedgerError::Transient(e.to_string()),
        }
    }
}
