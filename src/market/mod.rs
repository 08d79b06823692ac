//! Market data: snapshots, user positions, and the provider boundary

mod data;
pub mod loader;
mod provider;

pub use data::{MarketSnapshot, UserPosition};
pub use provider::{CachedProvider, FileProvider, MarketDataProvider, ProviderError};
