pub mod analysis;
pub mod ledger;
pub mod log;
pub mod tracer;
pub mod wallets;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use url::Url;

pub use analysis::AnalysisConfig;
pub use analysis::AnalysisProfile;
pub use ledger::LedgerConfig;
pub use log::LoggingConfig;
pub use tracer::TracerConfig;
pub use tracer::TracerMode;
pub use wallets::WalletsConfig;

use crate::constants::KASPA_API_URL_ENV;
use crate::err_with_loc;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerConfig,
    // Ledger settings for the full-history export; preset when absent
    pub full_history_ledger: Option<LedgerConfig>,
    pub tracer: TracerConfig,
    pub wallets: WalletsConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn ledger_for(
        &self,
        mode: TracerMode,
    ) -> LedgerConfig {
        match mode {
            TracerMode::FullHistory => self
                .full_history_ledger
                .clone()
                .unwrap_or_else(|| LedgerConfig::full_history(&self.ledger.base_url)),
            _ => self.ledger.clone(),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        for base_url in std::iter::once(&self.ledger.base_url).chain(self.full_history_ledger.iter().map(|l| &l.base_url)) {
            Url::parse(base_url).map_err(|e| err_with_loc!(ConfigError::InvalidBaseUrl(format!("{}: {}", base_url, e))))?;
        }

        if let Some(address) = self.wallets.overlapping() {
            return Err(err_with_loc!(ConfigError::OverlappingWallets(address.to_string())));
        }

        if let Some(threshold) = self.analysis.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(err_with_loc!(ConfigError::InvalidThreshold(threshold)));
            }
        }
        Ok(())
    }
}

pub fn parse_config(config_str: &str) -> crate::Result<Config> {
    let mut config: Config =
        toml::from_str(config_str).map_err(|e| err_with_loc!(ConfigError::ParseError(e.to_string())))?;

    if let Ok(base_url) = dotenvy::var(KASPA_API_URL_ENV) {
        info!("ledger_base_url_override::{}", base_url);
        config.ledger.base_url = base_url;
    }

    config.validate()?;
    Ok(config)
}

pub async fn load_config(path: impl AsRef<Path>) -> crate::Result<Config> {
    let path = path.as_ref();
    let config_str = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| err_with_loc!(ConfigError::OpenFileError(format!("{}: {}", path.display(), e))))?;
    parse_config(&config_str)
}
