// ─────────────────────────────────────────────────────────────────────────────
//  Muqtafi: Fund-Flow Crawler
//  Part of Athar, the provenance tracer for Kaspa bridge outflows.
//
//  Muqtafi (مقتفي): "The Tracker". Follows coins hop by hop away from the
//  bridge wallets and records every address it touches as a flow table.
//
//  Every step is checkpointed, so an interrupted crawl picks up where it stopped.
// ─────────────────────────────────────────────────────────────────────────────

use athar::engine::muqtafi::Muqtafi;
use athar::engine::muqtafi::MuqtafiArgs;
use athar::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    Muqtafi::run(MuqtafiArgs::parse()).await?;
    Ok(())
}
