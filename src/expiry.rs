use crate::config;
use crate::error::{Error, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};

// -----------------------------------------------
// EXPIRY DATE PARSING
// -----------------------------------------------

/// Parse an exchange expiry string. NSE serves `DD-MMM-YYYY`; ISO
/// (`YYYY-MM-DD`) is accepted for callers feeding dates from elsewhere.
pub fn parse_expiry_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, config::EXPIRY_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, config::EXPIRY_DATE_FORMAT_ISO))
        .map_err(|_| Error::InvalidInput(format!("unparseable expiry date: {}", raw)))
}

// -----------------------------------------------
// TARGET-MONTH SELECTION
// -----------------------------------------------

/// What to do when no expiry lands in the target month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fail immediately with `NoExpiryFound`.
    Strict,
    /// Walk months_ahead down one month at a time (e.g. 3 -> 2 -> 1 -> 0)
    /// until a month with an expiry is found.
    NearerMonth,
}

/// Pick the expiry in the month `months_ahead` calendar months from today.
/// Among several expiries in that month the chronologically latest wins
/// (the month-end contract). Uses the local clock; see
/// [`select_target_expiry_at`] for the pure variant.
pub fn select_target_expiry(
    expiry_dates: &[String],
    months_ahead: u32,
    fallback: FallbackPolicy,
) -> Result<String> {
    select_target_expiry_at(Local::now().date_naive(), expiry_dates, months_ahead, fallback)
}

/// Deterministic core of [`select_target_expiry`]: same inputs and the same
/// `today` always give the same answer.
pub fn select_target_expiry_at(
    today: NaiveDate,
    expiry_dates: &[String],
    months_ahead: u32,
    fallback: FallbackPolicy,
) -> Result<String> {
    if expiry_dates.is_empty() {
        return Err(Error::NoExpiryFound("empty expiry list".into()));
    }

    let mut parsed: Vec<(NaiveDate, &String)> = Vec::with_capacity(expiry_dates.len());
    for raw in expiry_dates {
        parsed.push((parse_expiry_date(raw)?, raw));
    }

    let mut ahead = months_ahead;
    loop {
        let (target_year, target_month) = add_months(today.year(), today.month(), ahead);

        let best = parsed
            .iter()
            .filter(|(date, _)| date.year() == target_year && date.month() == target_month)
            .max_by_key(|(date, _)| date.day());

        if let Some((_, raw)) = best {
            return Ok((*raw).clone());
        }

        match fallback {
            FallbackPolicy::Strict => {
                return Err(Error::NoExpiryFound(format!(
                    "no expiry in {:04}-{:02}",
                    target_year, target_month
                )));
            }
            FallbackPolicy::NearerMonth if ahead > 0 => ahead -= 1,
            FallbackPolicy::NearerMonth => {
                return Err(Error::NoExpiryFound(format!(
                    "no expiry within {} months of {}",
                    months_ahead, today
                )));
            }
        }
    }
}

/// Add calendar months, normalizing overflow into year increments.
fn add_months(year: i32, month: u32, months_ahead: u32) -> (i32, u32) {
    let zero_based = (month - 1) + months_ahead;
    (year + (zero_based / 12) as i32, (zero_based % 12) + 1)
}

// -----------------------------------------------
// NEAREST-EXPIRY SELECTION
// -----------------------------------------------

/// First expiry on or after today, skipping today's own expiry once the
/// exchange has closed (an expired contract is no longer tradable).
pub fn select_nearest(expiry_dates: &[String]) -> Result<String> {
    let now = Local::now();
    select_nearest_at(now.date_naive(), now.time(), expiry_dates)
}

pub fn select_nearest_at(
    today: NaiveDate,
    current_time: NaiveTime,
    expiry_dates: &[String],
) -> Result<String> {
    let mut parsed: Vec<(NaiveDate, &String)> = Vec::with_capacity(expiry_dates.len());
    for raw in expiry_dates {
        parsed.push((parse_expiry_date(raw)?, raw));
    }
    parsed.sort_by_key(|(date, _)| *date);

    let (cutoff_hour, cutoff_min) = config::EXPIRY_DAY_CUTOFF;
    let cutoff = NaiveTime::from_hms_opt(cutoff_hour, cutoff_min, 0)
        .unwrap_or(NaiveTime::MIN);

    for (date, raw) in parsed {
        if date < today {
            continue;
        }
        if date == today && current_time >= cutoff {
            continue;
        }
        return Ok(raw.clone());
    }

    Err(Error::NoExpiryFound(
        "all expiries past or beyond today's cutoff".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_both_formats() {
        assert_eq!(
            parse_expiry_date("28-Aug-2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
        );
        assert_eq!(
            parse_expiry_date("2026-08-28").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
        );
        assert!(parse_expiry_date("28/08/2026").is_err());
    }

    #[test]
    fn test_picks_latest_in_target_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        // Unordered on purpose: selection must not depend on input order.
        let list = dates(&["13-Aug-2026", "27-Aug-2026", "20-Aug-2026", "24-Sep-2026"]);

        let picked =
            select_target_expiry_at(today, &list, 0, FallbackPolicy::Strict).unwrap();
        assert_eq!(picked, "27-Aug-2026");
    }

    #[test]
    fn test_months_ahead_normalizes_year_overflow() {
        let today = NaiveDate::from_ymd_opt(2026, 11, 10).unwrap();
        let list = dates(&["26-Nov-2026", "31-Dec-2026", "29-Jan-2027"]);

        let picked =
            select_target_expiry_at(today, &list, 2, FallbackPolicy::Strict).unwrap();
        assert_eq!(picked, "29-Jan-2027");
    }

    #[test]
    fn test_fallback_walks_down_to_nearer_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        // Nothing 3 or 2 months out; September is the first hit.
        let list = dates(&["27-Aug-2026", "24-Sep-2026"]);

        let picked =
            select_target_expiry_at(today, &list, 3, FallbackPolicy::NearerMonth).unwrap();
        assert_eq!(picked, "24-Sep-2026");

        let err = select_target_expiry_at(today, &list, 3, FallbackPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::NoExpiryFound(_)));
    }

    #[test]
    fn test_fallback_exhaustion_fails() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let list = dates(&["26-Feb-2027"]);

        let err =
            select_target_expiry_at(today, &list, 3, FallbackPolicy::NearerMonth).unwrap_err();
        assert!(matches!(err, Error::NoExpiryFound(_)));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let list = dates(&["20-Aug-2026", "13-Aug-2026", "27-Aug-2026"]);

        let first =
            select_target_expiry_at(today, &list, 0, FallbackPolicy::Strict).unwrap();
        for _ in 0..10 {
            let again =
                select_target_expiry_at(today, &list, 0, FallbackPolicy::Strict).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_nearest_skips_past_and_cutoff() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 13).unwrap();
        let list = dates(&["06-Aug-2026", "13-Aug-2026", "20-Aug-2026"]);

        let before_close = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        assert_eq!(
            select_nearest_at(today, before_close, &list).unwrap(),
            "13-Aug-2026"
        );

        let after_close = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
        assert_eq!(
            select_nearest_at(today, after_close, &list).unwrap(),
            "20-Aug-2026"
        );
    }

    #[test]
    fn test_add_months() {
        assert_eq!(add_months(2026, 8, 0), (2026, 8));
        assert_eq!(add_months(2026, 8, 3), (2026, 11));
        assert_eq!(add_months(2026, 11, 2), (2027, 1));
        assert_eq!(add_months(2026, 12, 13), (2028, 1));
    }
}
