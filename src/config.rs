use std::time::Duration;

// -----------------------------------------------
// NSE API ENDPOINTS
// -----------------------------------------------
pub const NSE_BASE_URL: &str = "https://www.nseindia.com";

/// Warm-up pages fetched before any data request. Their bodies are ignored;
/// only the anti-bot cookies they set matter.
pub const WARMUP_PATHS: &[&str] = &["/", "/option-chain"];

pub fn contract_info_url(base_url: &str, symbol: &str) -> String {
    format!(
        "{}/api/option-chain-contract-info?symbol={}",
        base_url,
        urlencoding::encode(symbol)
    )
}

pub fn option_chain_url(base_url: &str, symbol: &str, expiry: &str) -> String {
    format!(
        "{}/api/option-chain-v3?type=Indices&symbol={}&expiry={}",
        base_url,
        urlencoding::encode(symbol),
        urlencoding::encode(expiry)
    )
}

// -----------------------------------------------
// BROWSER IDENTITY
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-IN,en;q=0.9",
];

pub const HEADER_REFERER: &str = "https://www.nseindia.com/option-chain";

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(25);

// Delay between session warm-up and the data request, so the anti-bot
// cookie state settles server-side before we hit the API.
pub const SETTLE_DELAY_MS: u64 = 1000;

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
// Per-request schedule: 2^attempt x RETRY_UNIT_MS, plus 0..RETRY_UNIT_MS
// of additive jitter, for RETRY_MAX_ATTEMPTS attempts total.
pub const RETRY_UNIT_MS: u64 = 1000;
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// -----------------------------------------------
// EXPIRY SELECTION
// -----------------------------------------------
pub const EXPIRY_DATE_FORMAT: &str = "%d-%b-%Y";
pub const EXPIRY_DATE_FORMAT_ISO: &str = "%Y-%m-%d";

/// Expiries on the current day are unusable after the exchange close (15:30).
pub const EXPIRY_DAY_CUTOFF: (u32, u32) = (15, 30);

/// Fallback ladder start for target-month selection: 3 -> 2 -> 1 -> 0.
pub const MAX_MONTHS_AHEAD: u32 = 3;

// -----------------------------------------------
// STRIKE WINDOW
// -----------------------------------------------
pub const STRIKE_WINDOW_RADIUS: usize = 6;

// -----------------------------------------------
// SPREAD ANALYSIS
// -----------------------------------------------
// NIFTY exchange-mandated lot size, used when a candidate leg carries none.
pub const DEFAULT_LOT_SIZE: u32 = 75;

pub const DEFAULT_CAPITAL: f64 = 100_000.0;

// Liquidity filter thresholds (both legs must satisfy both).
pub const MIN_VOLUME: u64 = 50;
pub const MIN_OPEN_INTEREST: u64 = 400;

// -----------------------------------------------
// GREEKS
// -----------------------------------------------
/// Annualized risk-free rate used when annotating legs.
pub const RISK_FREE_RATE: f64 = 0.065;
