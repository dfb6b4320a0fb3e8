use std::collections::BTreeSet;
use std::hint::black_box;
use std::time::Duration;

use athar::analysis::AttributionClassifier;
use athar::analysis::ReverseFundingIndex;
use athar::analysis::attribute;
use athar::analysis::collect_deposits;
use athar::analysis::threshold_sweep;
use athar::model::Address;
use athar::model::AddressFlowTable;
use athar::model::DestinationRegistry;
use athar::model::FlowEdge;
use athar::model::TableFormat;
use athar::utils::linspace;
use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;

/// Layered funding graph: every wallet is funded by two wallets of the layer
/// above, the last layer deposits at the exchange.
fn layered_tables(
    layers: usize,
    width: usize,
) -> Vec<AddressFlowTable> {
    let name = |layer: usize, i: usize| {
        if layer == 0 {
            Address::new("root")
        } else {
            Address::new(format!("w{}_{}", layer, i))
        }
    };

    let mut tx = 0usize;
    let mut tables = Vec::new();
    for layer in 1..=layers {
        for i in 0..width {
            let owner = name(layer, i);
            let mut edges = Vec::new();
            for funder in [name(layer - 1, i), name(layer - 1, (i + 1) % width)] {
                tx += 1;
                edges.push(FlowEdge {
                    tx_id: format!("tx{}", tx),
                    timestamp: None,
                    sender: funder,
                    recipient: owner.clone(),
                    amount: 1_000,
                });
            }
            if layer == layers {
                tx += 1;
                edges.push(FlowEdge {
                    tx_id: format!("tx{}", tx),
                    timestamp: None,
                    sender: owner.clone(),
                    recipient: Address::new("cex"),
                    amount: 500,
                });
            }
            tables.push(AddressFlowTable::from_edges(owner, TableFormat::Directional, edges));
        }
    }
    tables
}

fn bench_attribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("attribution");
    group.measurement_time(Duration::from_secs(10));

    let roots = BTreeSet::from([Address::new("root")]);
    let destinations = DestinationRegistry::from_pairs([("cex", "EX")]);

    for width in [10usize, 100, 500] {
        let tables = layered_tables(6, width);
        let index = ReverseFundingIndex::build(tables.iter());
        group.throughput(Throughput::Elements(tables.len() as u64));

        group.bench_with_input(BenchmarkId::new("attribute_depth_6", width), &tables, |b, tables| {
            b.iter(|| {
                let mut classifier = AttributionClassifier::new(&roots, &index, 6);
                black_box(attribute(tables, &mut classifier, &roots, &destinations))
            })
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("threshold_sweep");

    let roots = BTreeSet::from([Address::new("root")]);
    let destinations = DestinationRegistry::from_pairs([("cex", "EX")]);
    let tables = layered_tables(4, 200);
    let index = ReverseFundingIndex::build(tables.iter());
    let mut classifier = AttributionClassifier::new(&roots, &index, 4);
    let attribution = attribute(&tables, &mut classifier, &roots, &destinations);
    let deposits = collect_deposits(&tables, &destinations);
    let thresholds = linspace(0.80, 0.9999, 21);

    group.bench_function("21_steps", |b| {
        b.iter(|| black_box(threshold_sweep(&attribution, &deposits, &thresholds)))
    });
    group.finish();
}

criterion_group!(benches, bench_attribution, bench_sweep);
criterion_main!(benches);
