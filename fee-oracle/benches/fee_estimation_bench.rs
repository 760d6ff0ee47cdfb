use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eth_fee_oracle::{FeeEstimator, FeeHistorySample, Preset};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generate a fee history window of the given length with noisy fees
fn generate_fee_history(blocks: usize, percentiles: usize) -> FeeHistorySample {
    let mut rng = StdRng::seed_from_u64(42);

    let base_fees = (0..=blocks)
        .map(|_| rng.gen_range(5_000_000_000u128..50_000_000_000))
        .collect();
    let rewards = (0..blocks)
        .map(|_| {
            let mut row: Vec<u128> = (0..percentiles)
                .map(|_| rng.gen_range(0u128..5_000_000_000))
                .collect();
            row.sort_unstable();
            row
        })
        .collect();
    let ratios = (0..blocks).map(|_| rng.gen_range(0.0..=1.0)).collect();

    FeeHistorySample::new(base_fees, rewards, ratios).expect("generated sample is well formed")
}

fn benchmark_fee_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fee_estimation");

    // eth_feeHistory caps the window at 1024 blocks
    for blocks in [10, 100, 1024].iter() {
        let sample = generate_fee_history(*blocks, 4);
        let estimator = FeeEstimator::new();

        group.bench_with_input(BenchmarkId::new("blocks", blocks), blocks, |b, _| {
            b.iter(|| estimator.estimate(&sample));
        });
    }

    group.finish();
}

fn benchmark_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("presets");

    for preset in [Preset::Conservative, Preset::Wide] {
        let estimator = FeeEstimator::from_preset(preset);
        let sample = generate_fee_history(100, estimator.percentiles().len());

        group.bench_with_input(
            BenchmarkId::new("preset", preset.to_string()),
            &preset,
            |b, _| {
                b.iter(|| estimator.estimate(&sample));
            },
        );
    }

    group.finish();
}

fn benchmark_json_parsing(c: &mut Criterion) {
    let sample = generate_fee_history(1024, 4);
    let hex = |v: &u128| format!("0x{v:x}");
    let json = serde_json::json!({
        "oldestBlock": "0x1",
        "baseFeePerGas": sample.base_fees_per_block.iter().map(hex).collect::<Vec<_>>(),
        "gasUsedRatio": sample.gas_used_ratios,
        "reward": sample
            .rewards_per_block
            .iter()
            .map(|row| row.iter().map(hex).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    })
    .to_string();

    c.bench_function("parse_fee_history_1024", |b| {
        b.iter(|| FeeHistorySample::from_json(&json));
    });
}

criterion_group!(
    benches,
    benchmark_fee_estimation,
    benchmark_presets,
    benchmark_json_parsing
);
criterion_main!(benches);
