//! Matching of feed rows against alert rules and watches.
//!
//! Rules fire on exact equality of the selected price with the target;
//! watches fire when the last price is strictly above a positive target.
//! Nothing here deduplicates: the notification store does that.

use serde::Serialize;

use crate::models::{AlertRule, PriceRow, WatchEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "trigger", rename_all = "lowercase")]
pub enum MatchSource {
    Rule(AlertRule),
    Watch(WatchEntry),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMatch {
    pub commodity: String,
    pub source: MatchSource,
    /// Price text exactly as the feed sent it.
    pub matched_price: String,
}

pub fn evaluate(rows: &[PriceRow], rules: &[AlertRule], watches: &[WatchEntry]) -> Vec<AlertMatch> {
    let mut out = Vec::new();

    for row in rows {
        let last = parse_price(&row.last_price);

        for w in watches.iter().filter(|w| w.commodity == row.security_name) {
            let target = parse_price(&w.price_with_profit);
            if last > target && target > 0.0 {
                out.push(AlertMatch {
                    commodity: row.security_name.clone(),
                    source: MatchSource::Watch(w.clone()),
                    matched_price: row.last_price.clone(),
                });
            }
        }

        for r in rules.iter().filter(|r| r.commodity == row.security_name) {
            let raw = row.price(r.price_type);
            if parse_price(raw) == r.target_value {
                out.push(AlertMatch {
                    commodity: row.security_name.clone(),
                    source: MatchSource::Rule(r.clone()),
                    matched_price: raw.to_string(),
                });
            }
        }
    }

    out
}

/// Reads the leading decimal number of `s` the way a form field or feed cell
/// is read everywhere else in the app: `" 12.5 t"` is 12.5, and anything with
/// no numeric prefix (or a non-finite one) is 0.
pub fn parse_price(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0.0;
    }

    // optional exponent, only taken when it has digits
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}
