//! Secondary position metrics
//!
//! Ranking and yield helpers used by the presentation layer around the
//! core projection: none of these feed back into the engine.

use crate::error::EngineError;

/// Euclidean combination of position size and daily reward value.
///
/// Used to rank candidate positions on a scatter plot; larger is better on
/// both axes, so the distance from the origin orders them.
pub fn efficiency_score(position_value: f64, daily_reward_value: f64) -> f64 {
    position_value.hypot(daily_reward_value)
}

/// Annual staking yield of the base asset implied by the reward vault.
///
/// The vault balance pays out over two years, is distributed across all
/// staked units, and is quoted net of validator commission:
/// `rewards / 2 / staked / price * (1 - commission)`.
pub fn staking_yield(
    oracle_rewards_value: f64,
    total_staked: f64,
    base_asset_price: f64,
    validator_commission: f64,
) -> Result<f64, EngineError> {
    EngineError::require_non_negative("oracle_rewards_value", oracle_rewards_value)?;
    if total_staked <= 0.0 || total_staked.is_nan() {
        return Err(EngineError::InvalidSnapshot {
            field: "total_staked_base",
            value: total_staked,
            reason: "total stake must be strictly positive",
        });
    }
    if base_asset_price <= 0.0 || base_asset_price.is_nan() {
        return Err(EngineError::InvalidSnapshot {
            field: "prices",
            value: base_asset_price,
            reason: "price must be strictly positive",
        });
    }
    if !(0.0..=1.0).contains(&validator_commission) {
        return Err(EngineError::Domain {
            quantity: "validator_commission",
            value: validator_commission,
        });
    }

    Ok(oracle_rewards_value / 2.0 / total_staked / base_asset_price * (1.0 - validator_commission))
}

/// Yield of the derivative (yield-bearing) asset: the base asset's staking
/// yield scaled by the price discount at which the derivative trades.
pub fn derivative_staking_yield(
    base_asset_price: f64,
    derivative_price: f64,
    base_staking_yield: f64,
) -> Result<f64, EngineError> {
    if base_asset_price <= 0.0 || derivative_price <= 0.0 {
        return Err(EngineError::InvalidSnapshot {
            field: "prices",
            value: if base_asset_price <= 0.0 {
                base_asset_price
            } else {
                derivative_price
            },
            reason: "price must be strictly positive",
        });
    }
    Ok(base_asset_price / derivative_price * base_staking_yield)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_efficiency_score() {
        assert_relative_eq!(efficiency_score(3.0, 4.0), 5.0);
        assert_relative_eq!(efficiency_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_staking_yield() {
        // 10M UST of rewards over two years, 300M staked at $50, 5% commission
        let y = staking_yield(10_000_000.0, 300_000_000.0, 50.0, 0.05).unwrap();
        assert_relative_eq!(y, 10_000_000.0 / 2.0 / 300_000_000.0 / 50.0 * 0.95);
    }

    #[test]
    fn test_staking_yield_rejects_zero_stake() {
        assert!(staking_yield(1_000.0, 0.0, 50.0, 0.05).is_err());
    }

    #[test]
    fn test_derivative_yield_scales_with_discount() {
        // Derivative trading at a discount yields more than the base asset
        let y = derivative_staking_yield(85.0, 71.0, 0.08).unwrap();
        assert!(y > 0.08);
        assert_relative_eq!(y, 85.0 / 71.0 * 0.08);
    }
}
