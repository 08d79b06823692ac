//! Market snapshot and user position data structures

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point-in-time snapshot of market prices and protocol aggregates.
///
/// Fetched once per session by a [`MarketDataProvider`](crate::market::MarketDataProvider)
/// and treated as an immutable input to the engine. All quantities are
/// non-negative; prices are strictly positive (division by price occurs
/// downstream).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Asset symbol -> price, e.g. "LUNA", "yLUNA", "PRISM", "xPRISM"
    pub prices: HashMap<String, f64>,

    /// Total amount of the base asset staked protocol-wide
    pub total_staked_base: f64,

    /// Aggregate boost weight across all participants
    pub total_boost_weight: f64,

    /// Total amount of the pledge asset locked protocol-wide
    pub total_pledged_boost_asset: f64,

    /// When the snapshot was fetched (provider metadata, never read by the engine)
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Create a snapshot from prices and protocol aggregates
    pub fn new(
        prices: HashMap<String, f64>,
        total_staked_base: f64,
        total_boost_weight: f64,
        total_pledged_boost_asset: f64,
    ) -> Self {
        Self {
            prices,
            total_staked_base,
            total_boost_weight,
            total_pledged_boost_asset,
            fetched_at: None,
        }
    }

    /// Look up a price, failing on missing or non-positive entries.
    ///
    /// The engine never substitutes a default for a bad price.
    pub fn price(&self, symbol: &str) -> Result<f64, EngineError> {
        match self.prices.get(symbol) {
            None => Err(EngineError::MissingPrice(symbol.to_string())),
            Some(&p) if p <= 0.0 || p.is_nan() => Err(EngineError::InvalidSnapshot {
                field: "prices",
                value: p,
                reason: "price must be strictly positive",
            }),
            Some(&p) => Ok(p),
        }
    }

    /// Validate the snapshot invariants; a precondition of every engine call
    pub fn validate(&self) -> Result<(), EngineError> {
        for &price in self.prices.values() {
            if price <= 0.0 || price.is_nan() {
                return Err(EngineError::InvalidSnapshot {
                    field: "prices",
                    value: price,
                    reason: "price must be strictly positive",
                });
            }
        }
        if self.total_staked_base <= 0.0 || self.total_staked_base.is_nan() {
            return Err(EngineError::InvalidSnapshot {
                field: "total_staked_base",
                value: self.total_staked_base,
                reason: "total stake must be strictly positive",
            });
        }
        if self.total_boost_weight < 0.0 || self.total_boost_weight.is_nan() {
            return Err(EngineError::InvalidSnapshot {
                field: "total_boost_weight",
                value: self.total_boost_weight,
                reason: "aggregate boost weight must be non-negative",
            });
        }
        if self.total_pledged_boost_asset < 0.0 || self.total_pledged_boost_asset.is_nan() {
            return Err(EngineError::InvalidSnapshot {
                field: "total_pledged_boost_asset",
                value: self.total_pledged_boost_asset,
                reason: "total pledged amount must be non-negative",
            });
        }
        Ok(())
    }

    /// Aggregate boost units implied by the snapshot.
    ///
    /// The chain reports total boost *weight*; inverting
    /// `weight = sqrt(stake * boost)` for the protocol-as-one-participant
    /// gives `boost = weight^2 / stake`. Used as the day-0 base for
    /// projecting protocol-wide accrual.
    pub fn implied_total_boost(&self) -> f64 {
        self.total_boost_weight.powi(2) / self.total_staked_base
    }
}

/// A user's staking/pledging position.
///
/// Editable between engine invocations; the engine itself never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPosition {
    /// Amount of the yield-bearing asset the user has staked
    pub staked_amount: f64,

    /// Amount of the boost asset the user has pledged
    pub pledged_amount: f64,

    /// Previously accrued boost units
    #[serde(default)]
    pub accrued_boost: f64,

    /// Elapsed or planned pledge duration in days
    #[serde(default)]
    pub pledge_duration_days: u32,
}

impl UserPosition {
    /// Create a position with no accrued boost
    pub fn new(staked_amount: f64, pledged_amount: f64) -> Self {
        Self {
            staked_amount,
            pledged_amount,
            accrued_boost: 0.0,
            pledge_duration_days: 0,
        }
    }

    /// Validate that all quantities are non-negative
    pub fn validate(&self) -> Result<(), EngineError> {
        EngineError::require_non_negative("staked_amount", self.staked_amount)?;
        EngineError::require_non_negative("pledged_amount", self.pledged_amount)?;
        EngineError::require_non_negative("accrued_boost", self.accrued_boost)?;
        Ok(())
    }

    /// Change the pledged amount, applying the protocol's penalty rule:
    /// unpledging below the prior amount resets accrued boost to zero.
    pub fn set_pledged_amount(&mut self, new_amount: f64) {
        if new_amount < self.pledged_amount {
            self.accrued_boost = 0.0;
            self.pledge_duration_days = 0;
        }
        self.pledged_amount = new_amount;
    }

    /// Value of the staked position at the given price
    pub fn staked_value(&self, staked_asset_price: f64) -> f64 {
        self.staked_amount * staked_asset_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_snapshot() -> MarketSnapshot {
        let mut prices = HashMap::new();
        prices.insert("yLUNA".to_string(), 80.0);
        prices.insert("PRISM".to_string(), 0.5);
        MarketSnapshot::new(prices, 40_000_000.0, 3_000_000.0, 9_000_000.0)
    }

    #[test]
    fn test_snapshot_validates() {
        assert!(test_snapshot().validate().is_ok());
    }

    #[test]
    fn test_snapshot_rejects_zero_stake() {
        let mut snapshot = test_snapshot();
        snapshot.total_staked_base = 0.0;
        assert!(matches!(
            snapshot.validate(),
            Err(EngineError::InvalidSnapshot {
                field: "total_staked_base",
                ..
            })
        ));
    }

    #[test]
    fn test_price_lookup() {
        let snapshot = test_snapshot();
        assert_eq!(snapshot.price("yLUNA").unwrap(), 80.0);
        assert!(matches!(
            snapshot.price("xPRISM"),
            Err(EngineError::MissingPrice(_))
        ));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let mut snapshot = test_snapshot();
        snapshot.prices.insert("PRISM".to_string(), 0.0);
        assert!(snapshot.price("PRISM").is_err());
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_implied_total_boost() {
        let snapshot = test_snapshot();
        // weight^2 / stake = 9e12 / 4e7
        assert_eq!(snapshot.implied_total_boost(), 225_000.0);
    }

    #[test]
    fn test_unpledge_resets_boost() {
        let mut position = UserPosition {
            staked_amount: 500.0,
            pledged_amount: 500.0,
            accrued_boost: 1_200.0,
            pledge_duration_days: 30,
        };

        // Increasing the pledge keeps accrued boost
        position.set_pledged_amount(600.0);
        assert_eq!(position.accrued_boost, 1_200.0);

        // Decreasing it resets boost and duration
        position.set_pledged_amount(400.0);
        assert_eq!(position.accrued_boost, 0.0);
        assert_eq!(position.pledge_duration_days, 0);
    }

    #[test]
    fn test_position_rejects_negative() {
        let position = UserPosition::new(-1.0, 0.0);
        assert!(matches!(
            position.validate(),
            Err(EngineError::Domain {
                quantity: "staked_amount",
                ..
            })
        ));
    }
}
