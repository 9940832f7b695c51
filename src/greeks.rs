use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// -----------------------------------------------
// BLACK-SCHOLES GREEKS
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

/// First-order (plus gamma) sensitivities of a European option.
/// Theta is per calendar day; vega per 1% of volatility; rho per 1% of rate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OptionGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

/// Closed-form Black-Scholes Greeks.
///
/// `volatility` and `rate` are annualized fractions (0.15 = 15%), `time`
/// in years. Returns `None` when spot, strike, time or volatility is
/// non-positive: the formulas are undefined there, and annotation is
/// best-effort — a degenerate input must not abort a batch.
pub fn black_scholes(
    kind: OptionKind,
    spot: f64,
    strike: f64,
    time: f64,
    rate: f64,
    volatility: f64,
) -> Option<OptionGreeks> {
    if spot <= 0.0 || strike <= 0.0 || time <= 0.0 || volatility <= 0.0 {
        return None;
    }

    let sqrt_t = time.sqrt();
    let d1 = ((spot / strike).ln() + (rate + volatility * volatility / 2.0) * time)
        / (volatility * sqrt_t);
    let d2 = d1 - volatility * sqrt_t;

    let npd1 = norm_pdf(d1);
    let discount = (-rate * time).exp();

    let gamma = npd1 / (spot * volatility * sqrt_t);
    let vega = spot * sqrt_t * npd1 / 100.0;

    let greeks = match kind {
        OptionKind::Call => {
            let nd2 = norm_cdf(d2);
            OptionGreeks {
                delta: norm_cdf(d1),
                gamma,
                theta: (-(spot * npd1 * volatility) / (2.0 * sqrt_t)
                    - rate * strike * discount * nd2)
                    / 365.0,
                vega,
                rho: strike * time * discount * nd2 / 100.0,
            }
        }
        OptionKind::Put => {
            let nd2_neg = norm_cdf(-d2);
            OptionGreeks {
                delta: norm_cdf(-d1) - 1.0,
                gamma,
                theta: (-(spot * npd1 * volatility) / (2.0 * sqrt_t)
                    + rate * strike * discount * nd2_neg)
                    / 365.0,
                vega,
                rho: -strike * time * discount * nd2_neg / 100.0,
            }
        }
    };

    Some(greeks)
}

fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / (2.0_f64).sqrt()))
}

fn norm_pdf(x: f64) -> f64 {
    (-(x * x) / 2.0).exp() / (2.0 * PI).sqrt()
}

// Abramowitz-Stegun 7.1.26, max abs error 1.5e-7.
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
