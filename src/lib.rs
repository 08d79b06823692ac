//! Farm Calculator - Reward and APR projection engine for staking farms
//!
//! This library provides:
//! - Boost accrual and boost-weight math for pledge vaults
//! - Base/boost APR decomposition for staked positions
//! - Day-by-day forward projections of rewards under edited positions
//! - A market-data provider boundary with file and TTL-cache implementations
//! - Scenario runner for recompute-on-input-change dashboards

pub mod error;
pub mod market;
pub mod pool;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::EngineError;
pub use market::{MarketDataProvider, MarketSnapshot, UserPosition};
pub use pool::RewardPoolConfig;
pub use projection::{ProjectionPoint, ProjectionResult, RewardProjectionEngine};
pub use scenario::ScenarioRunner;
