mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use athar::config::AnalysisConfig;
use athar::config::AnalysisProfile;
use athar::engine::mizan::Mizan;
use athar::model::Address;
use athar::model::AddressFlowTable;
use athar::model::FlowEdge;
use athar::model::TableFormat;
use athar::pipeline::crawler::Tracer;
use athar::pipeline::datasource::LedgerApi;
use athar::storage::FlowTableStore;
use common::EXCHANGE;
use common::EXCHANGE_LABEL;
use common::FakeLedger;
use common::ROOT;
use common::test_config;
use common::transfer;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn edge(
    tx_id: &str,
    sender: &str,
    recipient: &str,
    amount: u64,
) -> FlowEdge {
    FlowEdge {
        tx_id: tx_id.to_string(),
        timestamp: None,
        sender: Address::new(sender),
        recipient: Address::new(recipient),
        amount,
    }
}

fn table(
    owner: &str,
    edges: Vec<FlowEdge>,
) -> AddressFlowTable {
    AddressFlowTable::from_edges(Address::new(owner), TableFormat::Directional, edges)
}

fn summary_config(
    threshold: f64,
    max_depth: u32,
) -> AnalysisConfig {
    AnalysisConfig {
        profile: AnalysisProfile::Summary,
        threshold: Some(threshold),
        max_depth: Some(max_depth),
        ..Default::default()
    }
}

fn roots() -> BTreeSet<Address> {
    BTreeSet::from([Address::new(ROOT)])
}

#[test_log::test(tokio::test)]
async fn test_crawl_then_attribute_single_hop_deposit() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 2);
    let ledger = Arc::new(
        FakeLedger::new(10)
            .with_transfer(transfer("t1", 1, ROOT, "i1", 1_000))
            .with_transfer(transfer("t2", 2, "i1", EXCHANGE, 1_000)),
    );
    let api: Arc<dyn LedgerApi> = ledger.clone();

    Tracer::from_config(api, &config).resume(&CancellationToken::new()).await.unwrap();

    let destinations = config.wallets.registry();
    let tables = FlowTableStore::new(dir.path(), TableFormat::Directional, destinations.clone())
        .load_all()
        .unwrap();
    assert_eq!(tables.len(), 2);

    let report = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 2));

    assert_eq!(report.verified, BTreeSet::from([Address::new("i1")]));
    assert_eq!(report.totals.total, 1_000);
    assert_eq!(report.totals.deposit_count, 1);
    assert_eq!(report.totals.label_total(EXCHANGE_LABEL), 1_000);
    assert!(report.sweep.is_none());
    assert!(report.shell.is_none());
}

#[test]
fn test_mixed_funding_only_passes_low_threshold() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    let tables = vec![
        table("i2", vec![
            edge("t1", ROOT, "i2", 500),
            edge("t2", "outsider", "i2", 500),
            edge("t3", "i2", EXCHANGE, 700),
        ]),
    ];

    let strict = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 2));
    assert!(strict.verified.is_empty());
    assert_eq!(strict.totals.total, 0);
    assert_eq!(strict.attribution.get(&Address::new("i2")).unwrap().chainge_pct, 0.5);

    let loose = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.5, 2));
    assert_eq!(loose.verified, BTreeSet::from([Address::new("i2")]));
    assert_eq!(loose.totals.total, 700);
}

#[test]
fn test_depth_budget_limits_multi_hop_attribution() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    let tables = vec![
        table("h1", vec![edge("t1", ROOT, "h1", 100), edge("t2", "h1", "h2", 100)]),
        table("h2", vec![edge("t2", "h1", "h2", 100), edge("t3", "h2", "h3", 100)]),
        table("h3", vec![edge("t3", "h2", "h3", 100), edge("t4", "h3", EXCHANGE, 90)]),
    ];

    // h3 <- h2 <- h1 <- root: the funder h2 is two hops from the root.
    let shallow = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 1));
    assert!(!shallow.verified.contains(&Address::new("h3")));
    assert_eq!(shallow.totals.total, 0);

    let deep = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 2));
    assert!(deep.verified.contains(&Address::new("h3")));
    assert_eq!(deep.totals.total, 90);
}

#[test]
fn test_duplicate_tables_count_deposit_once() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    let i1 = table("i1", vec![edge("t1", ROOT, "i1", 1_000), edge("t2", "i1", EXCHANGE, 400)]);
    let tables = vec![i1.clone(), i1];

    let report = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 2));

    assert_eq!(report.totals.deposit_count, 1);
    assert_eq!(report.totals.total, 400);
}

#[test]
fn test_zero_inflow_never_verified() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    // Sends to the exchange but nothing ever funded it.
    let tables = vec![table("dry", vec![edge("t1", "dry", EXCHANGE, 300)])];

    let report = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.0, 2));

    let result = report.attribution.get(&Address::new("dry")).unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(result.chainge_pct, 0.0);
    assert!(report.verified.is_empty());
    assert_eq!(report.totals.total, 0);
}

#[test]
fn test_root_deposits_are_not_attributed() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    let tables = vec![table(ROOT, vec![edge("t0", "funder", ROOT, 10), edge("t1", ROOT, EXCHANGE, 10)])];

    let report = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.0, 2));

    assert!(!report.verified.contains(&Address::new(ROOT)));
    assert_eq!(report.totals.total, 0);
}

#[test]
fn test_sweep_and_shell_profiles() {
    let destinations = test_config(std::path::Path::new("unused"), 2).wallets.registry();
    let tables = vec![
        table("i1", vec![edge("t1", ROOT, "i1", 950), edge("t2", "x", "i1", 50), edge("t3", "i1", EXCHANGE, 500)]),
    ];

    let sweep = Mizan::analyse(&tables, &roots(), &destinations, &AnalysisConfig {
        profile: AnalysisProfile::Sweep,
        sweep_start: 0.8,
        sweep_end: 1.0,
        sweep_steps: 3,
        ..Default::default()
    });
    let points = sweep.sweep.unwrap();
    assert_eq!(points.len(), 3);
    // i1 holds a 0.95 share: kept at 0.8 and 0.9, dropped at 1.0.
    assert_eq!(points.iter().map(|p| p.total).collect::<Vec<_>>(), vec![500, 500, 0]);

    let shell = Mizan::analyse(&tables, &roots(), &destinations, &AnalysisConfig {
        profile: AnalysisProfile::Shell,
        threshold: Some(0.85),
        ..Default::default()
    });
    let layout = shell.shell.unwrap();
    assert_eq!(layout.shells.len(), 3);
    assert!(layout.detached.is_empty());
}

#[tokio::test]
async fn test_report_files_written() {
    let dir = tempfile::tempdir().unwrap();
    let destinations = test_config(dir.path(), 2).wallets.registry();
    let tables = vec![table("i1", vec![edge("t1", ROOT, "i1", 1_000), edge("t2", "i1", EXCHANGE, 400)])];

    let report = Mizan::analyse(&tables, &roots(), &destinations, &summary_config(0.85, 2));
    let output_dir = dir.path().join("out");
    Mizan::write_report(&report, output_dir.to_str().unwrap()).unwrap();

    let read = |name: &str| -> serde_json::Value {
        serde_json::from_slice(&std::fs::read(output_dir.join(name)).unwrap()).unwrap()
    };
    assert_eq!(read("exchange_totals.json")["total"], 400);
    assert_eq!(read("verified_intermediaries.json")[0], "i1");
    assert_eq!(read("attribution.json")["results"]["i1"]["chainge_pct"], 1.0);
    assert!(output_dir.join("attribution.json").exists());
    assert!(!output_dir.join("threshold_sweep.json").exists());
}
