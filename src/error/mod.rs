pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod storage;

pub use anyhow::anyhow;
pub use anyhow::Context;
pub use anyhow::Error;
pub use anyhow::Result;
pub use checkpoint::CheckpointError;
pub use config::ConfigError;
pub use engine::EngineError;
pub use ledger::LedgerError;
pub use storage::StorageError;

// For consistent error handling with location info
#[macro_export]
macro_rules! err_with_loc {
    ($err:expr) => {
        anyhow::anyhow!($err).context(format!("at {}:{}", file!(), line!()))
    };
}
