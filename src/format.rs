//! Formatting helpers for user-visible numbers.
//!
//! Every helper degrades to a zero rendering on NaN or infinite input instead
//! of leaking `NaN` into notification text.

use num_format::{Locale, ToFormattedString};

/// Lenient parse used for inbound price strings: reads the longest numeric
/// prefix after leading whitespace (`"101.5abc"` is `101.5`). No numeric
/// prefix yields NaN.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digit_count += frac_end - (end + 1);
        end = frac_end;
    }
    if digit_count == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_start = end + 1;
        if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
            exp_start += 1;
        }
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

pub fn format_fixed2(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    format!("{:.2}", normalize_zero(value))
}

/// Signed percentage with two decimals.
///
/// Magnitudes strictly between 0 and 1 are read as fractions (`0.05` is 5%),
/// anything else as an already-scaled percentage. `1.0` is therefore `+1.00%`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0.00%".to_string();
    }

    let prefix = if value > 0.0 { "+" } else { "" };
    let scaled = if value.abs() > 0.0 && value.abs() < 1.0 {
        value * 100.0
    } else {
        value
    };

    format!("{}{:.2}%", prefix, normalize_zero(scaled))
}

/// Signed rendering of a value that is already in percent, e.g. `150.0` is
/// `+150.00%`. No fraction guessing.
pub fn format_signed_percent(percent: f64) -> String {
    if !percent.is_finite() {
        return "0.00%".to_string();
    }
    let prefix = if percent > 0.0 { "+" } else { "" };
    format!("{}{:.2}%", prefix, normalize_zero(percent))
}

/// en-US currency rendering, e.g. `$68,742.50`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}${}.{:02}",
        sign,
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}

pub fn format_compact_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    if value >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", normalize_zero(value))
    }
}

// `{:.2}` keeps the sign of -0.0
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
