// ─────────────────────────────────────────────────────────────────────────────
//  Mizan: Attribution Analyzer
//  Part of Athar, the provenance tracer for Kaspa bridge outflows.
//
//  Mizan (ميزان): "The Balance". Weighs every intermediary's inflow and
//  measures how much of what reached the exchanges began at the bridge.
// ─────────────────────────────────────────────────────────────────────────────

use athar::engine::mizan::Mizan;
use athar::engine::mizan::MizanArgs;
use athar::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    Mizan::run(MizanArgs::parse()).await?;
    Ok(())
}
