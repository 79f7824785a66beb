//! Text formatting for terminal output.

use rust_decimal::Decimal;

/// Dollar amount rounded to cents with comma-grouped dollars,
/// e.g. `-1234567.891` → `"-$1,234,567.89"`.
pub fn format_amount(val: Decimal) -> String {
    let cents = val.round_dp(2);
    let digits = format!("{:.2}", cents.abs());
    let (dollars, fraction) = digits.split_at(digits.len() - 3);

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if cents.is_sign_negative() && !cents.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}{fraction}")
}

/// Percentage with one decimal place, e.g. `"37.5%"`.
pub fn format_percentage(val: Decimal) -> String {
    format!("{:.1}%", val.round_dp(1))
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8.
pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max - 1).collect();
    format!("{truncated}…")
}
