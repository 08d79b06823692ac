//! Reward pool configuration: per-epoch distribution constants

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Static constants for one reward distribution epoch.
///
/// The boost accrual rate is deliberately a parameter rather than a
/// hard-coded constant: deployed vaults have used different rates
/// (0.5/day-class values expressed per hour here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPoolConfig {
    /// Total reward-token budget for the distribution epoch
    pub total_reward_budget: f64,

    /// Fraction of the budget allocated to the stake-proportional base pool;
    /// the remainder goes to the boost pool
    pub base_share_ratio: f64,

    /// Boost units accrued per unit of pledged asset per hour
    pub boost_accrual_rate_per_asset_per_hour: f64,

    /// Cap on boost units as a multiple of the pledged amount
    pub max_boost_multiplier: f64,

    /// Symbol of the yield-bearing asset users stake
    pub staked_asset: String,

    /// Symbol of the reward token being distributed
    pub reward_asset: String,

    /// Symbol of the asset users pledge to accrue boost
    pub pledge_asset: String,
}

/// Days used to annualize the epoch budget into a daily reward rate
pub const DAYS_PER_YEAR: f64 = 365.0;

impl RewardPoolConfig {
    /// The live PRISM Farm epoch: 130M PRISM over 12 months, 80% to the
    /// base pool, boost accruing at 0.021 AMPS per xPRISM per hour.
    pub fn default_prism_farm() -> Self {
        Self {
            total_reward_budget: 130_000_000.0,
            base_share_ratio: 0.8,
            boost_accrual_rate_per_asset_per_hour: 0.021,
            max_boost_multiplier: 100.0,
            staked_asset: "yLUNA".to_string(),
            reward_asset: "PRISM".to_string(),
            pledge_asset: "xPRISM".to_string(),
        }
    }

    /// Budget of the stake-proportional pool
    pub fn base_pool(&self) -> f64 {
        self.total_reward_budget * self.base_share_ratio
    }

    /// Budget of the boost-weighted pool
    pub fn boost_pool(&self) -> f64 {
        self.total_reward_budget * (1.0 - self.base_share_ratio)
    }

    /// Check the config invariants before any projection
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.total_reward_budget <= 0.0 || self.total_reward_budget.is_nan() {
            return Err(EngineError::InvalidConfig {
                field: "total_reward_budget",
                value: self.total_reward_budget,
                reason: "budget must be strictly positive",
            });
        }
        if !(0.0..=1.0).contains(&self.base_share_ratio) {
            return Err(EngineError::InvalidConfig {
                field: "base_share_ratio",
                value: self.base_share_ratio,
                reason: "ratio must be within [0, 1]",
            });
        }
        if self.boost_accrual_rate_per_asset_per_hour < 0.0
            || self.boost_accrual_rate_per_asset_per_hour.is_nan()
        {
            return Err(EngineError::InvalidConfig {
                field: "boost_accrual_rate_per_asset_per_hour",
                value: self.boost_accrual_rate_per_asset_per_hour,
                reason: "accrual rate must be non-negative",
            });
        }
        if self.max_boost_multiplier <= 0.0 || self.max_boost_multiplier.is_nan() {
            return Err(EngineError::InvalidConfig {
                field: "max_boost_multiplier",
                value: self.max_boost_multiplier,
                reason: "boost cap must be strictly positive",
            });
        }
        Ok(())
    }
}

impl Default for RewardPoolConfig {
    fn default() -> Self {
        Self::default_prism_farm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pool_split() {
        let config = RewardPoolConfig::default_prism_farm();
        assert_relative_eq!(config.base_pool(), 104_000_000.0, max_relative = 1e-12);
        assert_relative_eq!(config.boost_pool(), 26_000_000.0, max_relative = 1e-12);
        assert_relative_eq!(
            config.base_pool() + config.boost_pool(),
            config.total_reward_budget
        );
    }

    #[test]
    fn test_default_validates() {
        assert!(RewardPoolConfig::default_prism_farm().validate().is_ok());
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let config = RewardPoolConfig {
            base_share_ratio: 1.2,
            ..RewardPoolConfig::default_prism_farm()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig {
                field: "base_share_ratio",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = RewardPoolConfig {
            total_reward_budget: 0.0,
            ..RewardPoolConfig::default_prism_farm()
        };
        assert!(config.validate().is_err());
    }
}
