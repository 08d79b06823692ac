//! Farm Calculator CLI
//!
//! Command-line interface for running reward/APR projections against a
//! market snapshot, with user-adjustable position assumptions.

use anyhow::{bail, Context};
use clap::Parser;
use farm_calculator::market::loader::load_prices_csv;
use farm_calculator::{
    projection::efficiency_score, EngineError, MarketSnapshot, RewardPoolConfig,
    RewardProjectionEngine, UserPosition,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "farm_calculator", about = "Staking farm reward/APR projection")]
struct Args {
    /// JSON market snapshot file; a demo snapshot is used when omitted
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// CSV price table (symbol,price) overriding snapshot prices
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Current staked amount of the yield-bearing asset
    #[arg(long, default_value_t = 500.0)]
    staked: f64,

    /// Current pledged amount of the boost asset
    #[arg(long, default_value_t = 500.0)]
    pledged: f64,

    /// Boost units already accrued on the current pledge
    #[arg(long, default_value_t = 0.0)]
    accrued_boost: f64,

    /// Proposed staked amount (defaults to the current amount)
    #[arg(long)]
    new_staked: Option<f64>,

    /// Proposed pledged amount (defaults to the current amount)
    #[arg(long)]
    new_pledged: Option<f64>,

    /// Projection horizon in days
    #[arg(long, default_value_t = 60)]
    horizon: u32,

    /// Output CSV path for the full projection
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,
}

/// Demo snapshot with plausible market values, for running without a data file
fn demo_snapshot() -> MarketSnapshot {
    let mut prices = HashMap::new();
    prices.insert("LUNA".to_string(), 85.20);
    prices.insert("yLUNA".to_string(), 71.05);
    prices.insert("PRISM".to_string(), 0.42);
    prices.insert("xPRISM".to_string(), 0.45);
    MarketSnapshot::new(prices, 42_000_000.0, 3_100_000.0, 9_400_000.0)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    println!("Farm Calculator v0.1.0");
    println!("======================\n");

    let mut snapshot = match &args.snapshot {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open snapshot {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("failed to parse snapshot {}", path.display()))?
        }
        None => {
            println!("No snapshot file given, using demo market data.\n");
            demo_snapshot()
        }
    };

    if let Some(path) = &args.prices {
        let prices = load_prices_csv(path)
            .map_err(|e| anyhow::anyhow!("failed to load price table: {e}"))?;
        snapshot.prices.extend(prices);
    }

    let pool = RewardPoolConfig::default_prism_farm();
    println!("Reward pool: {} {} over the epoch", pool.total_reward_budget, pool.reward_asset);
    println!("  Base pool:  {:>14.0}", pool.base_pool());
    println!("  Boost pool: {:>14.0}\n", pool.boost_pool());

    let current = UserPosition {
        staked_amount: args.staked,
        pledged_amount: args.pledged,
        accrued_boost: args.accrued_boost,
        pledge_duration_days: 0,
    };
    let proposed = UserPosition::new(
        args.new_staked.unwrap_or(args.staked),
        args.new_pledged.unwrap_or(args.pledged),
    );

    let engine = RewardProjectionEngine::new(pool);

    // Day-0 metrics for the unmodified position
    match engine.day_zero(&snapshot, &current) {
        Ok(summary) => {
            println!("Current position:");
            println!("  {} staked:   {:>14.2}", engine.pool().staked_asset, summary.staked_amount);
            println!("  {} pledged:  {:>14.2}", engine.pool().pledge_asset, summary.pledged_amount);
            println!("  Boost accrued: {:>14.2}", summary.accrued_boost);
            println!("  Base APR:  {:>8.2}%", summary.base_apr);
            println!("  Boost APR: {:>8.2}%", summary.boost_apr);
            println!("  Total APR: {:>8.2}%\n", summary.total_apr);
        }
        Err(EngineError::UndefinedApr) => {
            println!("Current position has no stake; APR is undefined.\n");
        }
        Err(err) => bail!(err),
    }

    let result = engine.project(&snapshot, &current, &proposed, args.horizon)?;

    // Print the first days to console
    println!("Projected position ({} days):", args.horizon);
    println!(
        "{:>4} {:>14} {:>14} {:>10} {:>10} {:>10} {:>12} {:>14}",
        "Day", "Boost", "BoostWeight", "BaseAPR", "BoostAPR", "TotalAPR", "DailyUSD", "CumulativeUSD"
    );
    println!("{}", "-".repeat(96));

    for point in result.points.iter().take(10) {
        println!(
            "{:>4} {:>14.2} {:>14.2} {:>9.2}% {:>9.2}% {:>9.2}% {:>12.4} {:>14.4}",
            point.day,
            point.projected_boost,
            point.projected_boost_weight,
            point.base_apr,
            point.boost_apr,
            point.total_apr,
            point.daily_reward_value,
            point.cumulative_reward_value,
        );
    }
    if result.points.len() > 10 {
        println!("... ({} more days)", result.points.len() - 10);
    }

    // Write the full horizon to CSV
    let mut file = File::create(&args.output)
        .with_context(|| format!("unable to create {}", args.output.display()))?;
    writeln!(
        file,
        "Day,Boost,BoostWeight,TotalBoostWeight,BaseAPR,BoostAPR,TotalAPR,DailyRewardTokens,DailyRewardUSD,CumulativeRewardUSD"
    )?;
    for point in &result.points {
        writeln!(
            file,
            "{},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8},{:.8}",
            point.day,
            point.projected_boost,
            point.projected_boost_weight,
            point.projected_total_boost_weight,
            point.base_apr,
            point.boost_apr,
            point.total_apr,
            point.daily_reward_tokens,
            point.daily_reward_value,
            point.cumulative_reward_value,
        )?;
    }
    println!("\nFull results written to: {}", args.output.display());

    // Summary
    let summary = result.summary();
    let staked_price = snapshot.price(&engine.pool().staked_asset)?;
    let position_value = proposed.staked_value(staked_price);
    let final_daily = result
        .points
        .last()
        .map(|p| p.daily_reward_value)
        .unwrap_or(0.0);

    println!("\nSummary:");
    println!("  Horizon: {} days", summary.horizon_days);
    println!("  Final Base APR:  {:>8.2}%", summary.final_base_apr);
    println!("  Final Boost APR: {:>8.2}%", summary.final_boost_apr);
    println!("  Final Total APR: {:>8.2}%", summary.final_total_apr);
    println!("  Total rewards:   {:>14.2} {}", summary.total_reward_tokens, engine.pool().reward_asset);
    println!("  Cumulative USD:  {:>14.2}", summary.cumulative_reward_value);
    println!(
        "  Efficiency score: {:>13.2}",
        efficiency_score(position_value, final_daily)
    );

    Ok(())
}
