//! # Report Consensus Benchmarks
//!
//! | Path | Operation | Target |
//! |------|-----------|--------|
//! | Codec | contract hash of a large report | < 5ms |
//! | Codec | proof verification | < 1ms |
//! | Time Index | nearest lookup over a full scan window | < 1ms |
//! | Assembler | report build for 1,000 nodes | < 5ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ls_01_time_index::{nearest, TimeIndexEntry};
use ls_02_report_codec::{ConsumerUsage, Report, ReportCodec, StreamUsage};
use ls_04_report_assembler::{ReportBuilder, UsageAggregates};
use rand::Rng;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{Address, BundleId, SourceId};
use std::collections::BTreeMap;
use std::time::Duration;

fn random_address(rng: &mut impl Rng) -> Address {
    Address(rng.gen())
}

fn report_with(streams: usize, consumers: usize, nodes: usize) -> Report {
    let mut rng = rand::thread_rng();
    let mut report = Report::new(BundleId::new("75"), 2_000);
    report.treasury = 1_000;
    for i in 0..streams {
        report.streams.push(StreamUsage {
            id: format!("0xabc/stream-{}", i),
            capture: rng.gen_range(1..1_000_000),
            bytes: rng.gen_range(1..1_000_000),
        });
    }
    for _ in 0..consumers {
        report.consumers.push(ConsumerUsage {
            id: random_address(&mut rng),
            capture: rng.gen_range(1..1_000_000),
            bytes: rng.gen_range(1..1_000_000),
        });
    }
    for _ in 0..nodes {
        let node = random_address(&mut rng);
        report.nodes.insert(node, 500);
        report.delegates.insert(node, BTreeMap::from([(node, 500)]));
    }
    report
}

fn bench_contract_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("ls-02-report-codec");
    group.measurement_time(Duration::from_secs(5));
    let codec = ReportCodec::default();

    for size in [10, 100, 1_000] {
        let report = report_with(size, size, size / 10 + 1);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("contract_hash", size), &report, |b, r| {
            b.iter(|| black_box(codec.hash(r, Some(1_700_000_000_000)).unwrap()))
        });
    }

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let signer = Secp256k1KeyPair::generate();
    let report = report_with(100, 100, 10);
    let proof = runtime
        .block_on(codec.to_proof(&report, &signer, 1_700_000_000_000))
        .unwrap();
    group.bench_function("verify_proof", |b| {
        b.iter(|| black_box(codec.verify_proof(&report, &proof).is_ok()))
    });

    group.finish();
}

fn bench_nearest_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("ls-01-time-index");
    let source = SourceId::new("bench");

    for blocks in [100u64, 1_000, 10_000] {
        let candidates: Vec<_> = (0..blocks)
            .map(|n| TimeIndexEntry::new(n * 2_000, n, source.clone()))
            .collect();
        let target = blocks * 1_000 + 333;
        group.throughput(Throughput::Elements(blocks));
        group.bench_with_input(BenchmarkId::new("nearest", blocks), &candidates, |b, c| {
            b.iter(|| black_box(nearest(c, target)))
        });
    }
    group.finish();
}

fn bench_report_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("ls-04-report-assembler");
    let mut rng = rand::thread_rng();
    let builder = ReportBuilder::default();

    for nodes in [10, 100, 1_000] {
        let mut usage = UsageAggregates::default();
        for i in 0..nodes {
            usage.streams.insert(format!("stream-{}", i), rng.gen_range(1..10_000));
            usage
                .consumers
                .insert(random_address(&mut rng), rng.gen_range(1..10_000));
            let node = random_address(&mut rng);
            usage.nodes.insert(node, rng.gen_range(1..10_000));
            usage.delegations.insert(
                node,
                (0..4)
                    .map(|_| (random_address(&mut rng), rng.gen_range(1..1_000u128)))
                    .collect(),
            );
        }

        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::new("build", nodes), &usage, |b, u| {
            b.iter(|| black_box(builder.build(&BundleId::new("75"), 2_000, u).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_contract_hash,
    bench_nearest_lookup,
    bench_report_build
);
criterion_main!(benches);
