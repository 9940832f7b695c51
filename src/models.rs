use crate::config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// -----------------------------------------------
// WIRE STRUCTS (NSE JSON SHAPES)
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ContractInfo {
    #[serde(rename = "expiryDates")]
    pub expiry_dates: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResponse {
    pub records: Records,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(rename = "underlyingValue")]
    pub underlying_value: f64,

    pub data: Vec<RawStrikeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStrikeEntry {
    #[serde(rename = "strikePrice")]
    pub strike_price: f64,

    #[serde(rename = "CE")]
    pub call: Option<RawQuote>,

    #[serde(rename = "PE")]
    pub put: Option<RawQuote>,
}

/// One side of a strike as NSE serializes it. Fields default to zero;
/// illiquid strikes frequently omit them.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    #[serde(rename = "lastPrice", default)]
    pub last_price: f64,

    #[serde(default)]
    pub change: f64,

    #[serde(rename = "pChange", default)]
    pub p_change: f64,

    #[serde(rename = "totalTradedVolume", default)]
    pub total_traded_volume: f64,

    #[serde(rename = "openInterest", default)]
    pub open_interest: f64,

    #[serde(rename = "impliedVolatility", default)]
    pub implied_volatility: f64,
}

// -----------------------------------------------
// NORMALIZED SNAPSHOT
// -----------------------------------------------

/// One side (call or put) of a strike, normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionQuote {
    pub strike_price: f64,
    pub last_price: f64,
    pub change: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub open_interest: u64,
    /// Percent, as quoted by the exchange (e.g. 14.2 = 14.2%).
    pub implied_volatility: f64,
}

impl OptionQuote {
    fn from_raw(strike_price: f64, raw: &RawQuote) -> Self {
        Self {
            strike_price,
            last_price: raw.last_price,
            change: raw.change,
            percent_change: raw.p_change,
            volume: raw.total_traded_volume.max(0.0) as u64,
            open_interest: raw.open_interest.max(0.0) as u64,
            implied_volatility: raw.implied_volatility,
        }
    }

    /// A quote with no traded price is a placeholder row, not a market.
    pub fn is_tradable(&self) -> bool {
        self.last_price > 0.0
    }

    pub fn passes_liquidity_filter(&self) -> bool {
        self.volume >= config::MIN_VOLUME && self.open_interest >= config::MIN_OPEN_INTEREST
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeRow {
    pub strike_price: f64,
    pub call: Option<OptionQuote>,
    pub put: Option<OptionQuote>,
}

/// Normalized option chain for one symbol + expiry. Immutable once built:
/// strikes are unique and sorted ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChainSnapshot {
    pub symbol: String,
    pub expiry_date: String,
    pub underlying_value: f64,
    pub timestamp: String,
    pub rows: Vec<StrikeRow>,
}

impl OptionChainSnapshot {
    pub fn from_records(symbol: &str, expiry_date: &str, records: Records) -> Result<Self> {
        if !(records.underlying_value > 0.0) {
            return Err(Error::Upstream(format!(
                "non-positive underlyingValue {} for {}",
                records.underlying_value, symbol
            )));
        }

        let mut rows: Vec<StrikeRow> = records
            .data
            .iter()
            .map(|entry| StrikeRow {
                strike_price: entry.strike_price,
                call: entry
                    .call
                    .as_ref()
                    .map(|raw| OptionQuote::from_raw(entry.strike_price, raw)),
                put: entry
                    .put
                    .as_ref()
                    .map(|raw| OptionQuote::from_raw(entry.strike_price, raw)),
            })
            .collect();

        rows.sort_by(|a, b| {
            a.strike_price
                .partial_cmp(&b.strike_price)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows.dedup_by(|a, b| a.strike_price == b.strike_price);

        Ok(Self {
            symbol: symbol.to_string(),
            expiry_date: expiry_date.to_string(),
            underlying_value: records.underlying_value,
            timestamp: records.timestamp.unwrap_or_default(),
            rows,
        })
    }

    /// Ascending strike list.
    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.strike_price).collect()
    }

    pub fn row_at(&self, strike: f64) -> Option<&StrikeRow> {
        self.rows.iter().find(|row| row.strike_price == strike)
    }

    /// Replace the row set with the given strikes, preserving order.
    pub fn retain_strikes(&mut self, keep: &[f64]) {
        self.rows.retain(|row| keep.contains(&row.strike_price));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(volume: u64, open_interest: u64) -> OptionQuote {
        OptionQuote {
            strike_price: 25000.0,
            last_price: 50.0,
            change: 0.0,
            percent_change: 0.0,
            volume,
            open_interest,
            implied_volatility: 12.0,
        }
    }

    #[test]
    fn test_liquidity_filter_boundaries() {
        assert!(quote(50, 400).passes_liquidity_filter());
        assert!(!quote(49, 400).passes_liquidity_filter());
        assert!(!quote(50, 399).passes_liquidity_filter());
    }

    #[test]
    fn test_tradable_requires_positive_last_price() {
        let mut q = quote(100, 500);
        assert!(q.is_tradable());
        q.last_price = 0.0;
        assert!(!q.is_tradable());
    }

    #[test]
    fn test_snapshot_sorts_and_dedups_strikes() {
        let records = Records {
            timestamp: Some("06-Aug-2026 15:30:00".into()),
            underlying_value: 25000.0,
            data: vec![
                RawStrikeEntry { strike_price: 25100.0, call: None, put: None },
                RawStrikeEntry { strike_price: 24900.0, call: None, put: None },
                RawStrikeEntry { strike_price: 25100.0, call: None, put: None },
                RawStrikeEntry { strike_price: 25000.0, call: None, put: None },
            ],
        };

        let snapshot = OptionChainSnapshot::from_records("NIFTY", "28-Aug-2026", records).unwrap();
        assert_eq!(snapshot.strikes(), vec![24900.0, 25000.0, 25100.0]);
    }

    #[test]
    fn test_snapshot_rejects_bad_underlying() {
        let records = Records {
            timestamp: None,
            underlying_value: 0.0,
            data: vec![],
        };
        let err = OptionChainSnapshot::from_records("NIFTY", "28-Aug-2026", records).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_raw_quote_tolerates_missing_fields() {
        let raw: RawQuote = serde_json::from_str(r#"{"lastPrice": 42.5}"#).unwrap();
        let q = OptionQuote::from_raw(25000.0, &raw);
        assert_eq!(q.last_price, 42.5);
        assert_eq!(q.volume, 0);
        assert_eq!(q.open_interest, 0);
    }
}
