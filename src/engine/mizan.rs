use std::collections::BTreeSet;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::Result;
use crate::analysis::Attribution;
use crate::analysis::AttributionClassifier;
use crate::analysis::BalanceLedger;
use crate::analysis::ExchangeTotals;
use crate::analysis::ReverseFundingIndex;
use crate::analysis::SweepPoint;
use crate::analysis::VerifiedFlowGraph;
use crate::analysis::aggregate;
use crate::analysis::attribute;
use crate::analysis::collect_deposits;
use crate::analysis::flow_graph::ShellLayout;
use crate::analysis::threshold_sweep;
use crate::config::AnalysisConfig;
use crate::config::AnalysisProfile;
use crate::config::Config;
use crate::config::load_config;
use crate::constants::DEFAULT_DATA_DIR;
use crate::constants::FULL_HISTORY_DATA_DIR;
use crate::err_with_loc;
use crate::error::EngineError;
use crate::model::Address;
use crate::model::AddressFlowTable;
use crate::model::DestinationRegistry;
use crate::model::TableFormat;
use crate::storage::FlowTableStore;
use crate::storage::ReportWriter;
use crate::tracing::setup_tracing;
use crate::utils::linspace;
use crate::utils::sompi_to_kas;

#[derive(Debug, Clone, Parser)]
#[command(name = "mizan", about = "Root-funded attribution of exchange deposits")]
pub struct MizanArgs {
    /// Path to the TOML configuration
    #[arg(long, default_value = "Config.toml")]
    pub config: String,

    /// summary | sweep | shell
    #[arg(long)]
    pub profile: Option<AnalysisProfile>,

    /// Minimum root-funded fraction for a verified intermediary
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Backward hop budget of the classifier
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Directory of flow tables to analyse
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Directory for the JSON outputs
    #[arg(long)]
    pub output_dir: Option<String>,
}

impl MizanArgs {
    pub fn apply(
        &self,
        config: &mut Config,
    ) {
        if let Some(profile) = self.profile {
            config.analysis.profile = profile;
        }
        if let Some(threshold) = self.threshold {
            config.analysis.threshold = Some(threshold);
        }
        if let Some(max_depth) = self.max_depth {
            config.analysis.max_depth = Some(max_depth);
        }
        if let Some(data_dir) = &self.data_dir {
            config.analysis.data_dir = Some(data_dir.clone());
        }
        if let Some(output_dir) = &self.output_dir {
            config.analysis.output_dir = output_dir.clone();
        }
    }
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub profile: AnalysisProfile,
    pub threshold: f64,
    pub max_depth: u32,
    pub verified: BTreeSet<Address>,
    pub totals: ExchangeTotals,
    #[serde(skip)]
    pub attribution: Attribution,
    pub sweep: Option<Vec<SweepPoint>>,
    pub shell: Option<ShellLayout>,
}

pub struct Mizan;

impl Mizan {
    pub async fn run(args: MizanArgs) -> Result<()> {
        let mut config = load_config(&args.config).await?;
        args.apply(&mut config);
        config.validate()?;

        let _guards = setup_tracing("mizan", &config.logging)?;
        info!("Starting Mizan (ميزان): The Balance");

        let roots = config.wallets.root_set();
        let destinations = config.wallets.registry();
        let data_dir = config.analysis.data_dir.clone().unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let store = FlowTableStore::new(&data_dir, TableFormat::Directional, destinations.clone());
        let tables = store.load_all().map_err(|e| err_with_loc!(e))?;
        if tables.is_empty() {
            return Err(err_with_loc!(EngineError::NoFlowTables(data_dir)));
        }
        info!("flow_tables_loaded::{}::from::{}", tables.len(), data_dir);

        let report = Mizan::analyse(&tables, &roots, &destinations, &config.analysis);
        Mizan::write_report(&report, &config.analysis.output_dir)?;

        if !config.analysis.balance_wallets.is_empty() {
            Mizan::write_balances(&config, &destinations)?;
        }

        info!("mizan::shutdown");
        Ok(())
    }

    /// Pure analysis over loaded tables: attribution, verified set, exchange
    /// totals and the profile's extra output.
    pub fn analyse(
        tables: &[AddressFlowTable],
        roots: &BTreeSet<Address>,
        destinations: &DestinationRegistry,
        analysis: &AnalysisConfig,
    ) -> AnalysisReport {
        let threshold = analysis.effective_threshold();
        let max_depth = analysis.effective_max_depth();

        let index = ReverseFundingIndex::build(tables.iter());
        let mut classifier = AttributionClassifier::new(roots, &index, max_depth);
        let attribution = attribute(tables, &mut classifier, roots, destinations);
        let deposits = collect_deposits(tables, destinations);
        let verified = attribution.verified(threshold);
        let totals = aggregate(&deposits, &verified);

        info!(
            "attribution_summary::profile::{}::threshold::{}::max_depth::{}::verified::{}::deposits::{}::total_kas::{:.2}",
            analysis.profile,
            threshold,
            max_depth,
            verified.len(),
            totals.deposit_count,
            sompi_to_kas(totals.total)
        );
        for wallet in &totals.by_wallet {
            info!("exchange_total::{}::{}::{:.2}_kas", wallet.label, wallet.wallet, wallet.amount_kas);
        }

        let sweep = match analysis.profile {
            AnalysisProfile::Sweep => {
                let thresholds = linspace(analysis.sweep_start, analysis.sweep_end, analysis.sweep_steps);
                Some(threshold_sweep(&attribution, &deposits, &thresholds))
            },
            _ => None,
        };

        let shell = match analysis.profile {
            AnalysisProfile::Shell => {
                let graph = VerifiedFlowGraph::build(tables, &deposits, &verified, roots, destinations);
                info!("verified_flow_graph::nodes::{}::edges::{}", graph.get_node_count(), graph.get_edge_count());
                Some(graph.shell_layout())
            },
            _ => None,
        };

        AnalysisReport {
            profile: analysis.profile,
            threshold,
            max_depth,
            verified,
            totals,
            attribution,
            sweep,
            shell,
        }
    }

    pub fn write_report(
        report: &AnalysisReport,
        output_dir: &str,
    ) -> Result<()> {
        let writer = ReportWriter::new(output_dir);
        writer.write_json("verified_intermediaries", &report.verified).map_err(|e| err_with_loc!(e))?;
        writer.write_json("exchange_totals", &report.totals).map_err(|e| err_with_loc!(e))?;
        writer.write_json("attribution", &report.attribution).map_err(|e| err_with_loc!(e))?;
        if let Some(sweep) = &report.sweep {
            writer.write_json("threshold_sweep", sweep).map_err(|e| err_with_loc!(e))?;
        }
        if let Some(shell) = &report.shell {
            writer.write_json("flow_graph", shell).map_err(|e| err_with_loc!(e))?;
        }
        Ok(())
    }

    fn write_balances(
        config: &Config,
        destinations: &DestinationRegistry,
    ) -> Result<()> {
        let data_dir = config
            .analysis
            .balance_data_dir
            .clone()
            .unwrap_or_else(|| FULL_HISTORY_DATA_DIR.to_string());
        let store = FlowTableStore::new(&data_dir, TableFormat::FullHistory, destinations.clone());
        let tables = store.load_all().map_err(|e| err_with_loc!(e))?;

        let wallets: Vec<Address> = config.analysis.balance_wallets.iter().map(|w| Address::new(w.trim())).collect();
        let ledger = BalanceLedger::build(&tables, &wallets);
        for wallet in &ledger.wallets {
            info!(
                "wallet_balance::{}::max_kas::{:.2}::inflow_kas::{:.2}::outflow_kas::{:.2}",
                wallet.wallet,
                wallet.max_balance as f64 / crate::constants::SOMPI_PER_KAS as f64,
                sompi_to_kas(wallet.total_inflow),
                sompi_to_kas(wallet.total_outflow)
            );
        }

        ReportWriter::new(&config.analysis.output_dir)
            .write_json("balances", &ledger)
            .map_err(|e| err_with_loc!(e))?;
        Ok(())
    }
}
