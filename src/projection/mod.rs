//! Reward/APR projection engine and its output records

mod engine;
pub mod metrics;
mod point;
mod state;

pub use engine::RewardProjectionEngine;
pub use metrics::{derivative_staking_yield, efficiency_score, staking_yield};
pub use point::{
    AprComponents, DayZeroSummary, ProjectionPoint, ProjectionResult, ProjectionSummary,
};
pub use state::{Projection, ProjectionState};
