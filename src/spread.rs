use crate::config;
use crate::error::{Error, Result};
use crate::expiry::parse_expiry_date;
use crate::greeks::{black_scholes, OptionKind};
use crate::models::{OptionChainSnapshot, OptionQuote};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

// -----------------------------------------------
// CANDIDATE TYPES
// -----------------------------------------------

/// One leg of a candidate spread. Greeks, IV and lot size are genuinely
/// optional on NSE data; absent is absent, never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadLeg {
    pub strike: f64,
    pub premium: f64,
    pub volume: u64,
    pub open_interest: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_vol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<u32>,
}

impl SpreadLeg {
    pub fn passes_liquidity_filter(&self) -> bool {
        self.volume >= config::MIN_VOLUME && self.open_interest >= config::MIN_OPEN_INTEREST
    }
}

/// A bear put spread: buy the higher strike put, sell the lower one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadCandidate {
    pub long_put: SpreadLeg,
    pub short_put: SpreadLeg,
}

// -----------------------------------------------
// METRICS
// -----------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadMetrics {
    /// Upfront cost for one lot: (long premium - short premium) x lot size.
    pub net_debit: f64,
    pub strike_width: f64,
    pub max_profit: f64,
    pub max_loss: f64,
    pub breakeven: f64,
    /// None when max loss is zero or negative (a net credit): the ratio is
    /// undefined there, and checking beats trapping a division error.
    pub risk_reward: Option<f64>,
    /// Both legs satisfy the volume/OI liquidity thresholds. Annotation
    /// only; filtering is the caller's policy (see [`rank_spreads`]).
    pub liquidity_pass: bool,
    pub risk_percent_of_capital: f64,
    pub lot_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadAnalysis {
    pub candidate: SpreadCandidate,
    pub metrics: SpreadMetrics,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// -----------------------------------------------
// ANALYZER
// -----------------------------------------------

/// Compute metrics for every candidate. Pure: no network, no shared state,
/// fresh output objects per call.
///
/// Strike ordering is validated up front; a "bear put spread" whose long
/// strike is not above its short strike would produce meaningless numbers,
/// so it is rejected as `InvalidInput` instead.
pub fn analyze(candidates: &[SpreadCandidate], capital: f64) -> Result<Vec<SpreadAnalysis>> {
    if !(capital > 0.0) {
        return Err(Error::InvalidInput(format!(
            "capital must be positive, got {}",
            capital
        )));
    }

    candidates
        .iter()
        .map(|candidate| {
            if candidate.long_put.strike <= candidate.short_put.strike {
                return Err(Error::InvalidInput(format!(
                    "bear put spread needs long strike > short strike, got {} <= {}",
                    candidate.long_put.strike, candidate.short_put.strike
                )));
            }

            let lot_size = candidate
                .long_put
                .lot_size
                .or(candidate.short_put.lot_size)
                .unwrap_or(config::DEFAULT_LOT_SIZE);
            let lot = lot_size as f64;

            let net_debit =
                round2((candidate.long_put.premium - candidate.short_put.premium) * lot);
            let strike_width = candidate.long_put.strike - candidate.short_put.strike;
            let max_profit = round2(strike_width * lot - net_debit);
            let max_loss = net_debit;
            let breakeven = round2(candidate.long_put.strike - net_debit / lot);

            let risk_reward = if max_loss > 0.0 {
                Some(max_profit / max_loss)
            } else {
                None
            };

            let liquidity_pass = candidate.long_put.passes_liquidity_filter()
                && candidate.short_put.passes_liquidity_filter();

            Ok(SpreadAnalysis {
                candidate: candidate.clone(),
                metrics: SpreadMetrics {
                    net_debit,
                    strike_width,
                    max_profit,
                    max_loss,
                    breakeven,
                    risk_reward,
                    liquidity_pass,
                    risk_percent_of_capital: round2(max_loss / capital * 100.0),
                    lot_size,
                },
            })
        })
        .collect()
}

// -----------------------------------------------
// RANKING POLICY
// -----------------------------------------------

/// Deterministic ordering policy over analyzed spreads: keep candidates
/// that pass the liquidity filter and have a defined risk-reward, then
/// order by risk-reward descending, breakeven descending, net debit
/// ascending.
pub fn rank_spreads(analyses: Vec<SpreadAnalysis>) -> Vec<SpreadAnalysis> {
    let mut ranked: Vec<SpreadAnalysis> = analyses
        .into_iter()
        .filter(|a| a.metrics.liquidity_pass && a.metrics.risk_reward.is_some())
        .collect();

    ranked.sort_by(|a, b| {
        let rr_a = a.metrics.risk_reward.unwrap_or(f64::MIN);
        let rr_b = b.metrics.risk_reward.unwrap_or(f64::MIN);
        rr_b.partial_cmp(&rr_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.metrics
                    .breakeven
                    .partial_cmp(&a.metrics.breakeven)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(
                a.metrics
                    .net_debit
                    .partial_cmp(&b.metrics.net_debit)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    ranked
}

// -----------------------------------------------
// CANDIDATE PAIRING
// -----------------------------------------------

/// Enumerate bear-put-spread candidates from a snapshot: every (long,
/// short) put pair with the long strike above the short, both sides
/// tradable, at most `max_width_steps` strikes apart. Legs get a
/// best-effort Black-Scholes delta when the quote carries an IV and the
/// expiry parses.
pub fn build_candidates(
    snapshot: &OptionChainSnapshot,
    max_width_steps: usize,
) -> Vec<SpreadCandidate> {
    build_candidates_at(Local::now().date_naive(), snapshot, max_width_steps)
}

pub fn build_candidates_at(
    today: NaiveDate,
    snapshot: &OptionChainSnapshot,
    max_width_steps: usize,
) -> Vec<SpreadCandidate> {
    let years_to_expiry = parse_expiry_date(&snapshot.expiry_date)
        .ok()
        .map(|expiry| ((expiry - today).num_days().max(0) as f64) / 365.0);

    let puts: Vec<(f64, &OptionQuote)> = snapshot
        .rows
        .iter()
        .filter_map(|row| row.put.as_ref().map(|put| (row.strike_price, put)))
        .filter(|(_, put)| put.is_tradable())
        .collect();

    let mut candidates = Vec::new();
    for (short_idx, &(short_strike, short_quote)) in puts.iter().enumerate() {
        for &(long_strike, long_quote) in puts.iter().skip(short_idx + 1).take(max_width_steps) {
            candidates.push(SpreadCandidate {
                long_put: make_leg(long_strike, long_quote, snapshot.underlying_value, years_to_expiry),
                short_put: make_leg(short_strike, short_quote, snapshot.underlying_value, years_to_expiry),
            });
        }
    }

    candidates
}

fn make_leg(
    strike: f64,
    quote: &OptionQuote,
    spot: f64,
    years_to_expiry: Option<f64>,
) -> SpreadLeg {
    let annotated = years_to_expiry
        .filter(|_| quote.implied_volatility > 0.0)
        .and_then(|time| {
            black_scholes(
                OptionKind::Put,
                spot,
                strike,
                time,
                config::RISK_FREE_RATE,
                quote.implied_volatility / 100.0,
            )
        });

    SpreadLeg {
        strike,
        premium: quote.last_price,
        volume: quote.volume,
        open_interest: quote.open_interest,
        delta: annotated.as_ref().map(|g| g.delta),
        gamma: annotated.as_ref().map(|g| g.gamma),
        theta: annotated.as_ref().map(|g| g.theta),
        implied_vol: Some(quote.implied_volatility).filter(|iv| *iv > 0.0),
        lot_size: None,
    }
}
