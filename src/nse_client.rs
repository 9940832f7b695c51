use crate::config;
use crate::error::{Error, Result};
use crate::expiry::parse_expiry_date;
use crate::models::{ContractInfo, OptionChainResponse, OptionChainSnapshot};
use crate::session::ExchangeSession;
use chrono::NaiveDate;
use rand::{thread_rng, Rng};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

// -----------------------------------------------
// FETCHER CONFIG
// -----------------------------------------------
/// Knobs for the fetcher. Defaults are the production values; tests point
/// `base_url` at a local mock and shrink the delays to milliseconds.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Backoff unit: attempt n sleeps 2^n x unit + jitter(0..unit).
    pub retry_unit_ms: u64,
    /// Attempts per individual HTTP request, first try included.
    pub max_attempts: usize,
    /// Pause between warm-up and the data request so the anti-bot cookie
    /// state settles server-side.
    pub settle_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: config::NSE_BASE_URL.to_string(),
            timeout: config::HTTP_TIMEOUT,
            retry_unit_ms: config::RETRY_UNIT_MS,
            max_attempts: config::RETRY_MAX_ATTEMPTS,
            settle_delay_ms: config::SETTLE_DELAY_MS,
        }
    }
}

// -----------------------------------------------
// OPTION CHAIN FETCHER
// -----------------------------------------------
/// Retrieves normalized option-chain data, tolerating the transient
/// failures NSE's anti-bot gate produces.
///
/// Every logical fetch builds a fresh [`ExchangeSession`]: concurrent
/// fetches must never share cookie state, a deliberate trade-off of
/// connection reuse for request isolation.
pub struct OptionChainFetcher {
    client: Client,
    config: FetcherConfig,
}

impl OptionChainFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(FetcherConfig::default())
    }

    pub fn with_config(config: FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidInput(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Available expiry dates for a symbol, deduplicated and sorted
    /// ascending by actual date (`DD-MMM-YYYY` strings).
    pub async fn fetch_expiry_dates(&self, symbol: &str) -> Result<Vec<String>> {
        let mut session = ExchangeSession::new();
        self.warm_up(&mut session).await?;

        let url = config::contract_info_url(&self.config.base_url, symbol);
        let body = self.get_json(&mut session, &url).await?;

        let info: ContractInfo = serde_json::from_str(&body).map_err(|e| {
            Error::Upstream(format!("contract info for {}: {}", symbol, e))
        })?;

        let mut parsed: Vec<(NaiveDate, String)> = Vec::with_capacity(info.expiry_dates.len());
        for raw in info.expiry_dates {
            let date = parse_expiry_date(&raw)
                .map_err(|_| Error::Upstream(format!("unparseable expiry from upstream: {}", raw)))?;
            parsed.push((date, raw));
        }
        parsed.sort_by_key(|(date, _)| *date);
        parsed.dedup_by(|a, b| a.0 == b.0);

        Ok(parsed.into_iter().map(|(_, raw)| raw).collect())
    }

    /// Normalized snapshot for one symbol + expiry. Rows are kept raw
    /// (zero-priced quotes included); tradability filtering is the
    /// caller's decision.
    pub async fn fetch_snapshot(&self, symbol: &str, expiry: &str) -> Result<OptionChainSnapshot> {
        let mut session = ExchangeSession::new();
        self.warm_up(&mut session).await?;

        let url = config::option_chain_url(&self.config.base_url, symbol, expiry);
        let body = self.get_json(&mut session, &url).await?;

        let chain: OptionChainResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Upstream(format!("option chain for {} {}: {}", symbol, expiry, e))
        })?;

        OptionChainSnapshot::from_records(symbol, expiry, chain.records)
    }

    /// Visit the landing pages that hand out anti-bot cookies. Bodies are
    /// ignored; HTTP success is all that matters.
    async fn warm_up(&self, session: &mut ExchangeSession) -> Result<()> {
        for path in config::WARMUP_PATHS {
            let url = format!("{}{}", self.config.base_url, path);
            self.request_with_retry(session, &url, false).await?;
        }
        debug!(cookies = session.cookie_count(), "session warmed up");

        if self.config.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;
        }
        Ok(())
    }

    async fn get_json(&self, session: &mut ExchangeSession, url: &str) -> Result<String> {
        Ok(self
            .request_with_retry(session, url, true)
            .await?
            .unwrap_or_default())
    }

    /// One HTTP GET with the per-request retry policy: up to
    /// `max_attempts`, sleeping 2^attempt x unit + jitter between tries.
    /// Only transport-class failures retry; upstream/schema failures
    /// surface immediately. The final attempt's error propagates.
    async fn request_with_retry(
        &self,
        session: &mut ExchangeSession,
        url: &str,
        expect_json: bool,
    ) -> Result<Option<String>> {
        let unit = self.config.retry_unit_ms;
        let mut delays = backoff_delays(unit, self.config.max_attempts);

        let mut attempt = 1usize;
        loop {
            match self.attempt_request(session, url, expect_json).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() => match delays.next() {
                    Some(backoff) => {
                        let jitter = if unit > 0 {
                            thread_rng().gen_range(0..unit)
                        } else {
                            0
                        };
                        let delay = backoff + Duration::from_millis(jitter);
                        warn!(url, attempt, error = %err, ?delay, "request failed, backing off");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        warn!(url, attempt, error = %err, "retries exhausted");
                        return Err(err);
                    }
                },
                Err(err) => {
                    warn!(url, attempt, error = %err, "non-retryable failure");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt_request(
        &self,
        session: &mut ExchangeSession,
        url: &str,
        expect_json: bool,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .headers(session.request_headers())
            .send()
            .await?;

        // Cookie state from request N feeds request N+1.
        session.absorb_response(response.headers());

        let status = response.status();
        if status.is_success() {
            if !expect_json {
                return Ok(None);
            }

            let text = response.text().await?;
            let trimmed = text.trim_start();
            if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                let preview: String = text.chars().take(200).collect();
                return Err(Error::Upstream(format!(
                    "non-JSON response from {}: {}",
                    url, preview
                )));
            }
            Ok(Some(text))
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(Error::Transport(format!("status {} from {}", status, url)))
        } else {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            Err(Error::Upstream(format!(
                "status {} from {}: {}",
                status, url, preview
            )))
        }
    }
}

/// Inter-attempt delays before jitter: 2^attempt x unit for attempt 1..n-1.
fn backoff_delays(unit_ms: u64, max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(unit_ms)
        .take(max_attempts.saturating_sub(1))
}
