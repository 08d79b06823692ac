//! Scenario runner for recompute-on-input-change workflows
//!
//! The dashboard layer edits one input at a time (a price, a staked amount,
//! a pledge) and needs the whole output recomputed. This runner holds the
//! fetched snapshot and pool config once and exposes an explicit
//! `recompute(inputs) -> outputs` call per edit; no memoization is needed
//! for correctness since every projection is pure.

use crate::market::{MarketSnapshot, UserPosition};
use crate::pool::RewardPoolConfig;
use crate::projection::{ProjectionResult, RewardProjectionEngine};
use crate::EngineError;
use log::debug;

/// Default projection horizon shown by the dashboards
pub const DEFAULT_HORIZON_DAYS: u32 = 60;

/// Pre-loaded scenario runner for interactive what-if projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(snapshot, RewardPoolConfig::default_prism_farm());
///
/// // Recompute on every slider change
/// for pledged in [500.0, 1_000.0, 2_000.0] {
///     let proposed = UserPosition::new(500.0, pledged);
///     let result = runner.recompute(&current, &proposed)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    snapshot: MarketSnapshot,
    pool: RewardPoolConfig,
    horizon_days: u32,
}

impl ScenarioRunner {
    /// Create a runner over a fetched snapshot and pool config
    pub fn new(snapshot: MarketSnapshot, pool: RewardPoolConfig) -> Self {
        Self {
            snapshot,
            pool,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }

    /// Override the projection horizon
    pub fn with_horizon(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    /// Recompute the full projection for one edited position
    pub fn recompute(
        &self,
        current: &UserPosition,
        proposed: &UserPosition,
    ) -> Result<ProjectionResult, EngineError> {
        debug!(
            "recompute: staked {} -> {}, pledged {} -> {}",
            current.staked_amount,
            proposed.staked_amount,
            current.pledged_amount,
            proposed.pledged_amount
        );
        let engine = RewardProjectionEngine::new(self.pool.clone());
        engine.project(&self.snapshot, current, proposed, self.horizon_days)
    }

    /// Recompute for a batch of candidate positions against one current position
    pub fn recompute_batch(
        &self,
        current: &UserPosition,
        candidates: &[UserPosition],
    ) -> Vec<Result<ProjectionResult, EngineError>> {
        let engine = RewardProjectionEngine::new(self.pool.clone());
        candidates
            .iter()
            .map(|proposed| engine.project(&self.snapshot, current, proposed, self.horizon_days))
            .collect()
    }

    /// Run one position under several pool configurations (epoch what-ifs)
    pub fn recompute_configs(
        &self,
        current: &UserPosition,
        proposed: &UserPosition,
        configs: &[RewardPoolConfig],
    ) -> Vec<Result<ProjectionResult, EngineError>> {
        configs
            .iter()
            .map(|pool| {
                let engine = RewardProjectionEngine::new(pool.clone());
                engine.project(&self.snapshot, current, proposed, self.horizon_days)
            })
            .collect()
    }

    /// The snapshot this runner projects against
    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    /// Replace the snapshot after a manual refresh
    pub fn set_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = snapshot;
    }

    /// The pool configuration in effect
    pub fn pool(&self) -> &RewardPoolConfig {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn test_snapshot() -> MarketSnapshot {
        let mut prices = HashMap::new();
        prices.insert("yLUNA".to_string(), 71.0);
        prices.insert("PRISM".to_string(), 0.42);
        MarketSnapshot::new(prices, 40_000_000.0, 3_000_000.0, 9_000_000.0)
    }

    #[test]
    fn test_recompute_batch() {
        let runner = ScenarioRunner::new(test_snapshot(), RewardPoolConfig::default_prism_farm())
            .with_horizon(30);
        let current = UserPosition::new(500.0, 500.0);

        let candidates: Vec<_> = [500.0, 1_000.0, 2_000.0]
            .iter()
            .map(|&pledged| UserPosition::new(500.0, pledged))
            .collect();

        let results = runner.recompute_batch(&current, &candidates);
        assert_eq!(results.len(), 3);

        // A larger pledge never lowers the horizon-end total APR
        let summaries: Vec<_> = results
            .into_iter()
            .map(|r| r.unwrap().summary())
            .collect();
        assert!(summaries[2].final_total_apr > summaries[0].final_total_apr);
    }

    #[test]
    fn test_recompute_matches_engine() {
        let runner = ScenarioRunner::new(test_snapshot(), RewardPoolConfig::default_prism_farm());
        let current = UserPosition::new(500.0, 500.0);
        let proposed = UserPosition::new(800.0, 1_500.0);

        let via_runner = runner.recompute(&current, &proposed).unwrap();
        let engine = RewardProjectionEngine::new(RewardPoolConfig::default_prism_farm());
        let direct = engine
            .project(&test_snapshot(), &current, &proposed, DEFAULT_HORIZON_DAYS)
            .unwrap();

        assert_eq!(via_runner, direct);
    }
}
