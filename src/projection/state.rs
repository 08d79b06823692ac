//! Per-run projection state and the lazy day sequence

use super::point::ProjectionPoint;
use crate::pool::DAYS_PER_YEAR;

/// Inputs of one projection run, resolved and validated by the engine.
///
/// All protocol totals already include the user's delta against the
/// snapshot; everyone else's stakes and pledges are held fixed.
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// The user's simulated staked amount (constant over the horizon)
    pub staked_amount: f64,

    /// The user's simulated pledged amount (constant over the horizon)
    pub pledged_amount: f64,

    /// Boost carried from day 0; zero when the simulated pledge dropped
    /// below the original (the protocol's unpledge penalty)
    pub carried_boost: f64,

    /// Boost units accrued per pledged asset per hour
    pub accrual_rate_per_hour: f64,

    /// Hard cap on accrued boost, pledged_amount * max_boost_multiplier
    pub boost_cap: f64,

    /// Protocol-wide staked amount, snapshot plus the user's delta
    pub total_staked: f64,

    /// Protocol-wide pledged amount, snapshot plus the user's delta
    pub total_pledged: f64,

    /// Protocol-wide boost units at day 0, derived from the snapshot weight
    pub total_boost_day_zero: f64,

    /// Annual base-pool rewards for the user (stake share is constant)
    pub base_rewards: f64,

    /// Base-pool APR, percent (constant over the horizon)
    pub base_apr: f64,

    /// Budget of the boost-weighted pool
    pub boost_pool: f64,

    /// Reward-asset price from the snapshot
    pub reward_price: f64,

    /// Value of the user's staked position
    pub staked_value: f64,
}

impl ProjectionState {
    /// The user's boost units at the end of the given day
    pub fn user_boost_at(&self, day: u32) -> f64 {
        let hours = day as f64 * 24.0;
        let accrued = self.pledged_amount * self.accrual_rate_per_hour * hours;
        accrued.min(self.boost_cap) + self.carried_boost
    }

    /// Protocol-wide boost units at the end of the given day.
    /// Aggregate accrual is linear; the per-participant cap cannot be
    /// applied without knowing every pledger's amount.
    pub fn total_boost_at(&self, day: u32) -> f64 {
        let hours = day as f64 * 24.0;
        self.total_boost_day_zero + self.total_pledged * self.accrual_rate_per_hour * hours
    }

    /// Compute the projection point for one day, given the cumulative
    /// reward value through the prior day
    pub fn point_at(&self, day: u32, cumulative_before: f64) -> ProjectionPoint {
        let boost = self.user_boost_at(day);
        let boost_weight = (self.staked_amount * boost).sqrt();
        let total_boost_weight = (self.total_staked * self.total_boost_at(day)).sqrt();

        let boost_rewards = if total_boost_weight > 0.0 {
            self.boost_pool * boost_weight / total_boost_weight
        } else {
            0.0
        };

        let base_apr = self.base_apr;
        let boost_apr = boost_rewards * self.reward_price / self.staked_value * 100.0;

        let daily_reward_tokens = (self.base_rewards + boost_rewards) / DAYS_PER_YEAR;
        let daily_reward_value = daily_reward_tokens * self.reward_price;

        ProjectionPoint {
            day,
            projected_boost: boost,
            projected_boost_weight: boost_weight,
            projected_total_boost_weight: total_boost_weight,
            base_apr,
            boost_apr,
            total_apr: base_apr + boost_apr,
            daily_reward_tokens,
            daily_reward_value,
            cumulative_reward_value: cumulative_before + daily_reward_value,
        }
    }
}

/// Lazy, finite sequence of projection points, one per day.
///
/// Cloning before iteration restarts the sequence from day 1; two clones
/// iterated independently yield identical points.
#[derive(Debug, Clone)]
pub struct Projection {
    state: ProjectionState,
    day: u32,
    horizon_days: u32,
    cumulative_value: f64,
}

impl Projection {
    pub(super) fn new(state: ProjectionState, horizon_days: u32) -> Self {
        Self {
            state,
            day: 0,
            horizon_days,
            cumulative_value: 0.0,
        }
    }

    /// Rewind to day 0 without recomputing the run inputs
    pub fn restart(&mut self) {
        self.day = 0;
        self.cumulative_value = 0.0;
    }
}

impl Iterator for Projection {
    type Item = ProjectionPoint;

    fn next(&mut self) -> Option<ProjectionPoint> {
        if self.day >= self.horizon_days {
            return None;
        }
        self.day += 1;
        let point = self.state.point_at(self.day, self.cumulative_value);
        self.cumulative_value = point.cumulative_reward_value;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.horizon_days - self.day) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Projection {}
