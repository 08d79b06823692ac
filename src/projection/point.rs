//! Projection output structures

use serde::{Deserialize, Serialize};

/// APR components for a position at a single point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AprComponents {
    /// Reward tokens per year from the stake-proportional pool
    pub base_rewards: f64,

    /// Reward tokens per year from the boost-weighted pool
    pub boost_rewards: f64,

    /// The user's boost weight, sqrt(staked * boost)
    pub boost_weight: f64,

    /// Base pool APR, percent
    pub base_apr: f64,

    /// Boost pool APR, percent
    pub boost_apr: f64,

    /// Combined APR, percent
    pub total_apr: f64,
}

/// One simulated day of the forward projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// Simulated day, 1-indexed
    pub day: u32,

    /// The user's boost units at end of day (accrual plus carried boost)
    pub projected_boost: f64,

    /// The user's boost weight at end of day
    pub projected_boost_weight: f64,

    /// Protocol-wide boost weight at end of day
    pub projected_total_boost_weight: f64,

    /// Base pool APR, percent
    pub base_apr: f64,

    /// Boost pool APR, percent
    pub boost_apr: f64,

    /// Combined APR, percent
    pub total_apr: f64,

    /// Reward tokens earned this day
    pub daily_reward_tokens: f64,

    /// Value of this day's rewards at the reward-asset price
    pub daily_reward_value: f64,

    /// Running sum of daily reward values through this day
    pub cumulative_reward_value: f64,
}

/// Day-0 summary of the user's unmodified position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayZeroSummary {
    pub staked_amount: f64,
    pub pledged_amount: f64,
    pub accrued_boost: f64,
    pub boost_weight: f64,
    pub base_rewards: f64,
    pub boost_rewards: f64,
    pub base_apr: f64,
    pub boost_apr: f64,
    pub total_apr: f64,
    pub daily_reward_value: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Current-state summary, omitted when the current position has no stake
    /// (APR is undefined for an empty position)
    pub day_zero: Option<DayZeroSummary>,

    /// One point per simulated day, 1..=horizon
    pub points: Vec<ProjectionPoint>,
}

impl ProjectionResult {
    /// Aggregate statistics over the projected horizon
    pub fn summary(&self) -> ProjectionSummary {
        let last = self.points.last();
        ProjectionSummary {
            horizon_days: self.points.len() as u32,
            final_base_apr: last.map(|p| p.base_apr).unwrap_or(0.0),
            final_boost_apr: last.map(|p| p.boost_apr).unwrap_or(0.0),
            final_total_apr: last.map(|p| p.total_apr).unwrap_or(0.0),
            total_reward_tokens: self.points.iter().map(|p| p.daily_reward_tokens).sum(),
            cumulative_reward_value: last.map(|p| p.cumulative_reward_value).unwrap_or(0.0),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub horizon_days: u32,
    pub final_base_apr: f64,
    pub final_boost_apr: f64,
    pub final_total_apr: f64,
    pub total_reward_tokens: f64,
    pub cumulative_reward_value: f64,
}
