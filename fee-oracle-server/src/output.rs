//! Console rendering for the `estimate` command

use eth_fee_oracle::{format_gwei, FeeEstimate};
use std::fmt::Write;

use crate::config::DisplayConfig;

const WEI_PER_ETH: f64 = 1e18;

/// Cost in USD of spending `gas_limit` gas at `fee_per_gas` wei
pub fn estimated_cost_usd(fee_per_gas: u128, gas_limit: u64, eth_price_usd: f64) -> f64 {
    fee_per_gas as f64 * gas_limit as f64 / WEI_PER_ETH * eth_price_usd
}

/// Renders the recommendation table, with a cost column when an ETH price
/// is configured
pub fn render_table(estimate: &FeeEstimate, display: &DisplayConfig) -> String {
    let Some(eth_price) = display.eth_price_usd else {
        return estimate.to_string();
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Congestion: {:.1}% ({}), base fee {}",
        estimate.avg_utilization * 100.0,
        estimate.congestion,
        estimate.trend
    );
    let _ = writeln!(
        out,
        "Next block base fee: {} gwei",
        format_gwei(estimate.next_block_base_fee, 4)
    );
    let _ = writeln!(
        out,
        "{:<12} | {:<10} | {:>14} | {:>15} | {:>12}",
        "TIER", "WAIT", "MAX FEE (gwei)", "PRIORITY (gwei)", "COST (USD)"
    );
    let _ = writeln!(out, "{}", "-".repeat(75));

    for rec in &estimate.recommendations {
        let cost = estimated_cost_usd(rec.max_fee_per_gas, display.gas_limit, eth_price);
        let _ = writeln!(
            out,
            "{:<12} | {:<10} | {:>14} | {:>15} | {:>12}",
            rec.tier.to_uppercase(),
            rec.expected_wait.as_deref().unwrap_or("-"),
            format_gwei(rec.max_fee_per_gas, 2),
            format_gwei(rec.suggested_priority_fee, 2),
            format!("${cost:.2}")
        );
    }

    let _ = writeln!(
        out,
        "Cost assumes {} gas at ${:.2}/ETH and is an upper bound; the base fee is burned, the tip is paid.",
        display.gas_limit, eth_price
    );
    out
}
