//! Sweep candidate pledge amounts for a fixed stake
//!
//! Evaluates a grid of proposed positions in parallel and writes one row
//! per candidate with horizon-end APRs, cumulative rewards, and the
//! efficiency score used for scatter-plot ranking.

use anyhow::Context;
use farm_calculator::projection::efficiency_score;
use farm_calculator::{
    MarketSnapshot, ProjectionResult, RewardPoolConfig, RewardProjectionEngine, UserPosition,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::time::Instant;

const HORIZON_DAYS: u32 = 60;
const PLEDGE_STEPS: usize = 200;
const MAX_PLEDGE: f64 = 100_000.0;

/// One evaluated candidate position
#[derive(Debug, Clone)]
struct SweepRow {
    pledged: f64,
    final_total_apr: f64,
    final_boost_apr: f64,
    cumulative_reward_value: f64,
    efficiency: f64,
}

fn demo_snapshot() -> MarketSnapshot {
    let mut prices = HashMap::new();
    prices.insert("yLUNA".to_string(), 71.05);
    prices.insert("PRISM".to_string(), 0.42);
    prices.insert("xPRISM".to_string(), 0.45);
    MarketSnapshot::new(prices, 42_000_000.0, 3_100_000.0, 9_400_000.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let start = Instant::now();

    let snapshot = demo_snapshot();
    let pool = RewardPoolConfig::default_prism_farm();
    let current = UserPosition::new(500.0, 500.0);
    let staked_price = snapshot.price(&pool.staked_asset)?;

    println!(
        "Sweeping {} pledge candidates up to {} {}...",
        PLEDGE_STEPS, MAX_PLEDGE, pool.pledge_asset
    );

    let engine = RewardProjectionEngine::new(pool);
    let candidates: Vec<f64> = (0..=PLEDGE_STEPS)
        .map(|i| MAX_PLEDGE * i as f64 / PLEDGE_STEPS as f64)
        .collect();

    let rows: Vec<SweepRow> = candidates
        .par_iter()
        .map(|&pledged| {
            let proposed = UserPosition::new(current.staked_amount, pledged);
            let result: ProjectionResult = engine
                .project(&snapshot, &current, &proposed, HORIZON_DAYS)
                .expect("projection failed for sweep candidate");
            let summary = result.summary();
            let final_daily = result
                .points
                .last()
                .map(|p| p.daily_reward_value)
                .unwrap_or(0.0);

            SweepRow {
                pledged,
                final_total_apr: summary.final_total_apr,
                final_boost_apr: summary.final_boost_apr,
                cumulative_reward_value: summary.cumulative_reward_value,
                efficiency: efficiency_score(proposed.staked_value(staked_price), final_daily),
            }
        })
        .collect();

    println!("Sweep complete in {:?}", start.elapsed());

    let output_path = "pledge_sweep_output.csv";
    let mut file = File::create(output_path).context("failed to create output file")?;
    writeln!(
        file,
        "Pledged,FinalTotalAPR,FinalBoostAPR,CumulativeRewardUSD,EfficiencyScore"
    )?;
    for row in &rows {
        writeln!(
            file,
            "{:.2},{:.6},{:.6},{:.4},{:.4}",
            row.pledged,
            row.final_total_apr,
            row.final_boost_apr,
            row.cumulative_reward_value,
            row.efficiency,
        )?;
    }
    println!("Output written to {}", output_path);

    // Best candidates by horizon-end APR
    let best = rows
        .iter()
        .max_by(|a, b| a.final_total_apr.total_cmp(&b.final_total_apr))
        .expect("sweep produced no rows");
    println!("\nSweep summary:");
    println!(
        "  No pledge:   {:.2}% total APR",
        rows.first().map(|r| r.final_total_apr).unwrap_or(0.0)
    );
    println!(
        "  Best pledge: {:.0} -> {:.2}% total APR (${:.2} cumulative over {} days)",
        best.pledged, best.final_total_apr, best.cumulative_reward_value, HORIZON_DAYS
    );

    Ok(())
}
