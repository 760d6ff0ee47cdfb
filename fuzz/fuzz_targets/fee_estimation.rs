#![no_main]

use eth_fee_oracle::{FeeEstimator, FeeHistorySample, Preset};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // One byte of ratio plus four 8-byte tips per block, after a 16-byte base fee
    if data.len() < 16 + 33 {
        return;
    }

    let next_base_fee = u128::from_le_bytes(data[..16].try_into().unwrap());

    let mut rewards = Vec::new();
    let mut ratios = Vec::new();
    for chunk in data[16..].chunks_exact(33).take(1024) {
        ratios.push(chunk[0] as f64 / 255.0);
        rewards.push(
            chunk[1..]
                .chunks_exact(8)
                .map(|b| u64::from_le_bytes(b.try_into().unwrap()) as u128)
                .collect::<Vec<_>>(),
        );
    }

    let blocks = rewards.len();
    let mut base_fees = vec![next_base_fee / 2; blocks];
    base_fees.push(next_base_fee);

    let Ok(sample) = FeeHistorySample::new(base_fees, rewards, ratios) else {
        return;
    };

    // This should not panic regardless of input
    let Ok(estimate) = FeeEstimator::from_preset(Preset::Wide).estimate(&sample) else {
        return;
    };

    for rec in &estimate.recommendations {
        assert!(rec.projected_base_fee >= next_base_fee);
        assert_eq!(
            rec.max_fee_per_gas,
            rec.projected_base_fee.saturating_add(rec.suggested_priority_fee)
        );
    }
});
