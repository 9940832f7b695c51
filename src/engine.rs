use crate::config;
use crate::error::Result;
use crate::expiry::{self, FallbackPolicy};
use crate::models::OptionChainSnapshot;
use crate::nse_client::{FetcherConfig, OptionChainFetcher};
use crate::spread::{self, SpreadAnalysis, SpreadCandidate};
use crate::strikes;
use tracing::info;

// -----------------------------------------------
// SERVICE CONFIG
// -----------------------------------------------

#[derive(Debug, Clone)]
pub enum ExpiryPolicy {
    /// First expiry on/after today (skipping today's after the close).
    Nearest,
    /// The month-end expiry `months_ahead` calendar months out, with the
    /// configured fallback when that month is empty.
    TargetMonth {
        months_ahead: u32,
        fallback: FallbackPolicy,
    },
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub expiry_policy: ExpiryPolicy,
    pub window_radius: usize,
    pub fetcher: FetcherConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            expiry_policy: ExpiryPolicy::Nearest,
            window_radius: config::STRIKE_WINDOW_RADIUS,
            fetcher: FetcherConfig::default(),
        }
    }
}

// -----------------------------------------------
// OPTION CHAIN SERVICE
// -----------------------------------------------

/// The entry point the surrounding application calls: expiry selection,
/// chain fetch and ATM windowing composed into one operation.
pub struct OptionChainService {
    fetcher: OptionChainFetcher,
    expiry_policy: ExpiryPolicy,
    window_radius: usize,
}

impl OptionChainService {
    pub fn new() -> Result<Self> {
        Self::with_config(ServiceConfig::default())
    }

    pub fn with_config(config: ServiceConfig) -> Result<Self> {
        Ok(Self {
            fetcher: OptionChainFetcher::with_config(config.fetcher)?,
            expiry_policy: config.expiry_policy,
            window_radius: config.window_radius,
        })
    }

    /// Fetch the chain for `symbol` at the policy-selected expiry,
    /// narrowed to the strike window around the money.
    pub async fn get_option_chain(&self, symbol: &str) -> Result<OptionChainSnapshot> {
        let expiries = self.fetcher.fetch_expiry_dates(symbol).await?;

        let expiry = match &self.expiry_policy {
            ExpiryPolicy::Nearest => expiry::select_nearest(&expiries)?,
            ExpiryPolicy::TargetMonth { months_ahead, fallback } => {
                expiry::select_target_expiry(&expiries, *months_ahead, *fallback)?
            }
        };
        info!(symbol, %expiry, "expiry selected");

        let mut snapshot = self.fetcher.fetch_snapshot(symbol, &expiry).await?;

        let all_strikes = snapshot.strikes();
        if let Some(atm) = strikes::find_closest_strike(&all_strikes, snapshot.underlying_value) {
            let window = strikes::window_around(&all_strikes, atm, self.window_radius);
            snapshot.retain_strikes(&window);
            info!(
                symbol,
                atm,
                kept = snapshot.rows.len(),
                total = all_strikes.len(),
                "strike window applied"
            );
        }

        Ok(snapshot)
    }
}

/// Spread-computation entry point for the surrounding application.
/// `capital` defaults to the configured account size.
pub fn analyze_spreads(
    candidates: &[SpreadCandidate],
    capital: Option<f64>,
) -> Result<Vec<SpreadAnalysis>> {
    spread::analyze(candidates, capital.unwrap_or(config::DEFAULT_CAPITAL))
}
