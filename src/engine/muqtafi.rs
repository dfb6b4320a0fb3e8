use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::Result;
use crate::config::Config;
use crate::config::TracerMode;
use crate::config::load_config;
use crate::error::EngineError;
use crate::pipeline::crawler::CrawlSummary;
use crate::pipeline::crawler::Tracer;
use crate::pipeline::datasource::KaspaApiClient;
use crate::pipeline::datasource::LedgerApi;
use crate::tracing::setup_tracing;

#[derive(Debug, Clone, Parser)]
#[command(name = "muqtafi", about = "Resumable fund-flow crawler over the Kaspa ledger")]
pub struct MuqtafiArgs {
    /// Path to the TOML configuration
    #[arg(long, default_value = "Config.toml")]
    pub config: String,

    /// general | flow | full-history
    #[arg(long)]
    pub mode: Option<TracerMode>,

    /// Override the mode's hop budget
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Re-crawl addresses that are already completed
    #[arg(long)]
    pub force: bool,

    /// Override the mode's data directory
    #[arg(long)]
    pub data_dir: Option<String>,
}

impl MuqtafiArgs {
    pub fn apply(
        &self,
        config: &mut Config,
    ) {
        if let Some(mode) = self.mode {
            config.tracer.mode = mode;
        }
        if let Some(max_depth) = self.max_depth {
            config.tracer.max_depth = Some(max_depth);
        }
        if self.force {
            config.tracer.force = true;
        }
        if let Some(data_dir) = &self.data_dir {
            config.tracer.data_dir = Some(data_dir.clone());
        }
    }
}

pub struct Muqtafi {
    pub config: Config,
    pub tracer: Tracer,
}

impl Muqtafi {
    pub fn new(
        config: Config,
        api: Arc<dyn LedgerApi>,
    ) -> Self {
        let tracer = Tracer::from_config(api, &config);
        Self { config, tracer }
    }

    pub async fn run(args: MuqtafiArgs) -> Result<()> {
        let mut config = load_config(&args.config).await?;
        args.apply(&mut config);

        let _guards = setup_tracing("muqtafi", &config.logging)?;
        info!("Starting Muqtafi (مقتفي): The Tracer");

        let mode = config.tracer.mode;
        let api: Arc<dyn LedgerApi> = Arc::new(KaspaApiClient::new(&config.ledger_for(mode))?);
        let muqtafi = Muqtafi::new(config, api);

        info!(
            "tracer_configured::mode::{}::max_depth::{}::data_dir::{}::force::{}",
            mode,
            muqtafi.tracer.options().max_depth,
            muqtafi.tracer.tables().dir().display(),
            muqtafi.tracer.options().force
        );

        let cancellation_token = CancellationToken::new();
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("termination_signal::finishing_current_address");
                    signal_token.cancel();
                },
                Err(e) => error!("failed_to_listen_for_ctrl_c::{}", e),
            }
        });

        let summary = muqtafi.trace(&cancellation_token).await?;
        if summary.partial > 0 {
            warn!("crawl_has_partial_addresses::{}::rerun_with_force_to_retry", summary.partial);
        }

        info!("muqtafi::shutdown");
        Ok(())
    }

    pub async fn trace(
        &self,
        cancellation_token: &CancellationToken,
    ) -> Result<CrawlSummary> {
        self.tracer.resume(cancellation_token).await.map_err(|e| {
            // Alternate form keeps the whole chain, down to the checkpoint path and parse error.
            let reason = format!("{:#}", e);
            error!("crawl_aborted::{}", reason);
            e.context(EngineError::CrawlAborted(reason))
        })
    }
}
