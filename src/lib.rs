pub mod analysis;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod storage;
pub mod tracing;
pub mod utils;

pub use engine::*;
pub use error::*;

pub use error::{CheckpointError, ConfigError, EngineError, LedgerError, StorageError};

pub use error::Result;
