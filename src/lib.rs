pub mod config;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod greeks;
pub mod logging;
pub mod models;
pub mod nse_client;
pub mod session;
pub mod spread;
pub mod strikes;

// Re-exports (public API)
pub use engine::{analyze_spreads, ExpiryPolicy, OptionChainService, ServiceConfig};
pub use error::{Error, Result};
pub use expiry::{select_nearest, select_target_expiry, FallbackPolicy};
pub use greeks::{black_scholes, OptionGreeks, OptionKind};
pub use models::{OptionChainSnapshot, OptionQuote, StrikeRow};
pub use nse_client::{FetcherConfig, OptionChainFetcher};
pub use session::ExchangeSession;
pub use spread::{
    analyze, build_candidates, rank_spreads, SpreadAnalysis, SpreadCandidate, SpreadLeg,
    SpreadMetrics,
};
pub use strikes::{find_closest_strike, window_around};
