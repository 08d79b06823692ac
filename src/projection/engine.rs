//! Core reward projection engine
//!
//! Pure function from (snapshot, position, pool config, horizon) to a
//! per-day sequence of projection points plus a day-0 summary. The engine
//! is stateless and side-effect-free; it may be invoked concurrently
//! without coordination.

use super::point::{AprComponents, DayZeroSummary, ProjectionPoint, ProjectionResult};
use super::state::{Projection, ProjectionState};
use crate::error::EngineError;
use crate::market::{MarketSnapshot, UserPosition};
use crate::pool::{RewardPoolConfig, DAYS_PER_YEAR};

/// Main projection engine
#[derive(Debug, Clone)]
pub struct RewardProjectionEngine {
    pool: RewardPoolConfig,
}

impl RewardProjectionEngine {
    /// Create an engine for one reward pool epoch
    pub fn new(pool: RewardPoolConfig) -> Self {
        Self { pool }
    }

    /// The pool configuration this engine projects against
    pub fn pool(&self) -> &RewardPoolConfig {
        &self.pool
    }

    /// Boost accrued by a pledge over a duration.
    ///
    /// Linear in time up to a hard cap proportional to the pledged amount:
    /// the vault stops awarding extra weight past the maximum pledge
    /// duration. Zero pledge accrues zero boost regardless of duration.
    pub fn compute_boost(
        &self,
        pledged_amount: f64,
        duration_hours: f64,
    ) -> Result<f64, EngineError> {
        EngineError::require_non_negative("pledged_amount", pledged_amount)?;
        EngineError::require_non_negative("duration_hours", duration_hours)?;

        let accrued =
            pledged_amount * self.pool.boost_accrual_rate_per_asset_per_hour * duration_hours;
        Ok(accrued.min(pledged_amount * self.pool.max_boost_multiplier))
    }

    /// Boost weight: geometric mean of stake and boost.
    ///
    /// Rewards participants who have both staked and pledged; either
    /// quantity at zero gives zero weight. Negative inputs fail rather
    /// than propagate NaN out of the sqrt.
    pub fn compute_boost_weight(staked_amount: f64, boost: f64) -> Result<f64, EngineError> {
        EngineError::require_non_negative("staked_amount", staked_amount)?;
        EngineError::require_non_negative("boost", boost)?;
        Ok((staked_amount * boost).sqrt())
    }

    /// Current APR components for a position with the given boost units,
    /// apportioned against the given protocol-wide boost weight.
    ///
    /// Fails with [`EngineError::UndefinedApr`] when the position has no
    /// stake: the denominator of every APR is the staked value.
    pub fn compute_apr_components(
        &self,
        snapshot: &MarketSnapshot,
        position: &UserPosition,
        boost: f64,
        total_boost_weight: f64,
    ) -> Result<AprComponents, EngineError> {
        snapshot.validate()?;
        position.validate()?;
        EngineError::require_non_negative("total_boost_weight", total_boost_weight)?;

        if position.staked_amount == 0.0 {
            return Err(EngineError::UndefinedApr);
        }

        let reward_price = snapshot.price(&self.pool.reward_asset)?;
        let staked_price = snapshot.price(&self.pool.staked_asset)?;

        let base_rewards =
            self.pool.base_pool() * position.staked_amount / snapshot.total_staked_base;
        let boost_weight = Self::compute_boost_weight(position.staked_amount, boost)?;
        let boost_rewards = if total_boost_weight > 0.0 {
            self.pool.boost_pool() * boost_weight / total_boost_weight
        } else {
            0.0
        };

        let staked_value = position.staked_value(staked_price);
        let base_apr = base_rewards * reward_price / staked_value * 100.0;
        let boost_apr = boost_rewards * reward_price / staked_value * 100.0;

        Ok(AprComponents {
            base_rewards,
            boost_rewards,
            boost_weight,
            base_apr,
            boost_apr,
            total_apr: base_apr + boost_apr,
        })
    }

    /// Day-0 summary of an unmodified position.
    ///
    /// The position's boost is its accrued units plus whatever its recorded
    /// pledge duration implies, so both queried positions (accrued set,
    /// duration zero) and hand-built ones (duration set, accrued zero)
    /// evaluate without special cases.
    pub fn day_zero(
        &self,
        snapshot: &MarketSnapshot,
        position: &UserPosition,
    ) -> Result<DayZeroSummary, EngineError> {
        self.pool.validate()?;

        let duration_hours = position.pledge_duration_days as f64 * 24.0;
        let boost =
            position.accrued_boost + self.compute_boost(position.pledged_amount, duration_hours)?;

        let apr =
            self.compute_apr_components(snapshot, position, boost, snapshot.total_boost_weight)?;
        let reward_price = snapshot.price(&self.pool.reward_asset)?;

        Ok(DayZeroSummary {
            staked_amount: position.staked_amount,
            pledged_amount: position.pledged_amount,
            accrued_boost: boost,
            boost_weight: apr.boost_weight,
            base_rewards: apr.base_rewards,
            boost_rewards: apr.boost_rewards,
            base_apr: apr.base_apr,
            boost_apr: apr.boost_apr,
            total_apr: apr.total_apr,
            daily_reward_value: (apr.base_rewards + apr.boost_rewards) / DAYS_PER_YEAR
                * reward_price,
        })
    }

    /// Lazy forward projection of a proposed position against the snapshot.
    ///
    /// One point per day from 1 to `horizon_days`. Protocol totals are held
    /// at the snapshot values plus the user's own delta (a single-user
    /// marginal projection, not a multi-agent simulation). If the proposed
    /// pledge is below the current one, the carried boost resets to zero.
    pub fn iter_days(
        &self,
        snapshot: &MarketSnapshot,
        current: &UserPosition,
        proposed: &UserPosition,
        horizon_days: u32,
    ) -> Result<Projection, EngineError> {
        let state = self.build_state(snapshot, current, proposed)?;
        Ok(Projection::new(state, horizon_days))
    }

    /// Eager forward projection: the day sequence collected into a result,
    /// with the day-0 summary of the current position attached when defined.
    pub fn project(
        &self,
        snapshot: &MarketSnapshot,
        current: &UserPosition,
        proposed: &UserPosition,
        horizon_days: u32,
    ) -> Result<ProjectionResult, EngineError> {
        let points: Vec<ProjectionPoint> = self
            .iter_days(snapshot, current, proposed, horizon_days)?
            .collect();

        let day_zero = match self.day_zero(snapshot, current) {
            Ok(summary) => Some(summary),
            Err(EngineError::UndefinedApr) => None,
            Err(err) => return Err(err),
        };

        Ok(ProjectionResult { day_zero, points })
    }

    /// Validate all inputs and resolve the per-run constants
    fn build_state(
        &self,
        snapshot: &MarketSnapshot,
        current: &UserPosition,
        proposed: &UserPosition,
    ) -> Result<ProjectionState, EngineError> {
        self.pool.validate()?;
        snapshot.validate()?;
        current.validate()?;
        proposed.validate()?;

        if proposed.staked_amount == 0.0 {
            return Err(EngineError::UndefinedApr);
        }

        let reward_price = snapshot.price(&self.pool.reward_asset)?;
        let staked_price = snapshot.price(&self.pool.staked_asset)?;

        // Everyone else is held fixed; only the user's delta moves the totals
        let total_staked =
            snapshot.total_staked_base + proposed.staked_amount - current.staked_amount;
        let total_pledged =
            snapshot.total_pledged_boost_asset + proposed.pledged_amount - current.pledged_amount;

        if total_staked <= 0.0 {
            return Err(EngineError::Domain {
                quantity: "projected total staked",
                value: total_staked,
            });
        }
        if total_pledged < 0.0 {
            return Err(EngineError::Domain {
                quantity: "projected total pledged",
                value: total_pledged,
            });
        }

        // Unpledging below the original amount forfeits accrued boost
        let carried_boost = if proposed.pledged_amount < current.pledged_amount {
            0.0
        } else {
            current.accrued_boost
        };

        let base_rewards = self.pool.base_pool() * proposed.staked_amount / total_staked;
        let staked_value = proposed.staked_value(staked_price);
        let base_apr = base_rewards * reward_price / staked_value * 100.0;

        Ok(ProjectionState {
            staked_amount: proposed.staked_amount,
            pledged_amount: proposed.pledged_amount,
            carried_boost,
            accrual_rate_per_hour: self.pool.boost_accrual_rate_per_asset_per_hour,
            boost_cap: proposed.pledged_amount * self.pool.max_boost_multiplier,
            total_staked,
            total_pledged,
            total_boost_day_zero: snapshot.implied_total_boost(),
            base_rewards,
            base_apr,
            boost_pool: self.pool.boost_pool(),
            reward_price,
            staked_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn test_snapshot() -> MarketSnapshot {
        let mut prices = HashMap::new();
        prices.insert("LUNA".to_string(), 85.0);
        prices.insert("yLUNA".to_string(), 71.0);
        prices.insert("PRISM".to_string(), 0.42);
        prices.insert("xPRISM".to_string(), 0.45);
        MarketSnapshot::new(prices, 40_000_000.0, 3_000_000.0, 9_000_000.0)
    }

    fn test_engine() -> RewardProjectionEngine {
        RewardProjectionEngine::new(RewardPoolConfig::default_prism_farm())
    }

    fn test_position() -> UserPosition {
        UserPosition {
            staked_amount: 500.0,
            pledged_amount: 500.0,
            accrued_boost: 0.0,
            pledge_duration_days: 30,
        }
    }

    #[test]
    fn test_boost_concrete_scenario() {
        // 500 pledged at 0.021/hour for 30 days: min(7560, 50000) = 7560
        let engine = test_engine();
        let boost = engine.compute_boost(500.0, 30.0 * 24.0).unwrap();
        assert_relative_eq!(boost, 7_560.0);

        let weight = RewardProjectionEngine::compute_boost_weight(500.0, boost).unwrap();
        assert_relative_eq!(weight, 3_780_000.0_f64.sqrt());
        assert_relative_eq!(weight, 1_944.222, epsilon = 1e-3);
    }

    #[test]
    fn test_boost_cap_enforced() {
        let engine = test_engine();
        // Arbitrarily long duration saturates at pledged * max multiplier
        let boost = engine.compute_boost(500.0, 1.0e9).unwrap();
        assert_relative_eq!(boost, 50_000.0);
    }

    #[test]
    fn test_zero_pledge_identity() {
        let engine = test_engine();
        assert_eq!(engine.compute_boost(0.0, 5_000.0).unwrap(), 0.0);
        assert_eq!(
            RewardProjectionEngine::compute_boost_weight(1_000.0, 0.0).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_boost_monotone_in_pledge() {
        let engine = test_engine();
        let duration = 30.0 * 24.0;
        let mut prev = 0.0;
        for pledged in [0.0, 100.0, 500.0, 2_500.0, 10_000.0] {
            let boost = engine.compute_boost(pledged, duration).unwrap();
            assert!(boost >= prev);
            prev = boost;
        }
    }

    #[test]
    fn test_weight_monotone_in_boost() {
        let w1 = RewardProjectionEngine::compute_boost_weight(500.0, 1_000.0).unwrap();
        let w2 = RewardProjectionEngine::compute_boost_weight(500.0, 2_000.0).unwrap();
        assert!(w2 > w1);
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let engine = test_engine();
        assert!(matches!(
            RewardProjectionEngine::compute_boost_weight(-1.0, 10.0),
            Err(EngineError::Domain { .. })
        ));
        assert!(matches!(
            engine.compute_boost(-5.0, 24.0),
            Err(EngineError::Domain { .. })
        ));
    }

    #[test]
    fn test_apr_undefined_on_zero_stake() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let position = UserPosition::new(0.0, 500.0);

        let result = engine.compute_apr_components(&snapshot, &position, 100.0, 1_000.0);
        assert_eq!(result, Err(EngineError::UndefinedApr));
    }

    #[test]
    fn test_apr_components_formulas() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let position = test_position();
        let boost = 7_560.0;

        let apr = engine
            .compute_apr_components(&snapshot, &position, boost, snapshot.total_boost_weight)
            .unwrap();

        // base: 104M * 500 / 40M = 1300 tokens/year
        assert_relative_eq!(apr.base_rewards, 1_300.0);
        // boost: 26M * sqrt(500 * 7560) / 3M
        let expected_weight = 3_780_000.0_f64.sqrt();
        assert_relative_eq!(apr.boost_weight, expected_weight);
        assert_relative_eq!(
            apr.boost_rewards,
            26_000_000.0 * expected_weight / 3_000_000.0,
            max_relative = 1e-12
        );

        let staked_value = 500.0 * 71.0;
        assert_relative_eq!(apr.base_apr, 1_300.0 * 0.42 / staked_value * 100.0);
        assert_relative_eq!(apr.total_apr, apr.base_apr + apr.boost_apr);
    }

    #[test]
    fn test_projection_deterministic() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = test_position();
        let proposed = UserPosition::new(800.0, 1_000.0);

        let a = engine.project(&snapshot, &current, &proposed, 60).unwrap();
        let b = engine.project(&snapshot, &current, &proposed, 60).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_projection_reset_rule() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = UserPosition {
            staked_amount: 500.0,
            pledged_amount: 500.0,
            accrued_boost: 3_000.0,
            pledge_duration_days: 0,
        };

        // Pledging less than before: carried boost forfeited
        let reduced = UserPosition::new(500.0, 400.0);
        let points: Vec<_> = engine
            .iter_days(&snapshot, &current, &reduced, 5)
            .unwrap()
            .collect();
        let day1_accrual = 400.0 * 0.021 * 24.0;
        assert_relative_eq!(points[0].projected_boost, day1_accrual);

        // Pledging the same or more: carried boost is additive
        let kept = UserPosition::new(500.0, 500.0);
        let points: Vec<_> = engine
            .iter_days(&snapshot, &current, &kept, 5)
            .unwrap()
            .collect();
        assert_relative_eq!(points[0].projected_boost, 500.0 * 0.021 * 24.0 + 3_000.0);
    }

    #[test]
    fn test_projection_marginal_totals() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = test_position();
        let proposed = UserPosition::new(1_500.0, 2_500.0);

        let state = engine.build_state(&snapshot, &current, &proposed).unwrap();
        assert_relative_eq!(state.total_staked, 40_000_000.0 + 1_000.0);
        assert_relative_eq!(state.total_pledged, 9_000_000.0 + 2_000.0);
    }

    #[test]
    fn test_projection_rejects_zero_stake() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = test_position();
        let proposed = UserPosition::new(0.0, 500.0);

        let result = engine.project(&snapshot, &current, &proposed, 60);
        assert_eq!(result.unwrap_err(), EngineError::UndefinedApr);
    }

    #[test]
    fn test_day_zero_omitted_for_empty_current_position() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = UserPosition::new(0.0, 0.0);
        let proposed = UserPosition::new(500.0, 500.0);

        let result = engine.project(&snapshot, &current, &proposed, 30).unwrap();
        assert!(result.day_zero.is_none());
        assert_eq!(result.points.len(), 30);
    }

    #[test]
    fn test_missing_price_is_invalid_snapshot() {
        let engine = test_engine();
        let mut snapshot = test_snapshot();
        snapshot.prices.remove("PRISM");

        let position = test_position();
        let result = engine.day_zero(&snapshot, &position);
        assert!(matches!(result, Err(EngineError::MissingPrice(_))));
    }

    #[test]
    fn test_boost_apr_grows_with_pledge_duration() {
        let engine = test_engine();
        let snapshot = test_snapshot();
        let current = test_position();
        let proposed = UserPosition::new(500.0, 5_000.0);

        let points: Vec<_> = engine
            .iter_days(&snapshot, &current, &proposed, 60)
            .unwrap()
            .collect();

        // More accrued boost each day; the user's weight grows faster than
        // the diluting aggregate, so boost APR rises over the horizon
        assert!(points[59].boost_apr > points[0].boost_apr);
        // Base APR is unaffected by pledging
        assert_relative_eq!(points[59].base_apr, points[0].base_apr);
    }
}
