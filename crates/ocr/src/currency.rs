use std::sync::OnceLock;

use regex::Regex;

/// A run of digits with embedded `.`/`,` separators, e.g. `1.250.000` or `45,500`.
fn re_numeric() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\d+[.,\d]*").expect("invalid regex"))
}

/// Numeric substrings of `line`, left to right.
pub fn numeric_tokens(line: &str) -> impl DoubleEndedIterator<Item = &str> {
    re_numeric()
        .find_iter(line)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .into_iter()
}

/// Keep only the decimal digits of `token` and read them as an integer.
///
/// Separators are discarded, so `50.000` and `50.00` both read as the digits
/// they contain. Receipts in Rupiah carry no sub-unit, so a separator is
/// always a thousands separator. No digits yields 0; a digit run too long for
/// `u64` saturates.
pub fn clean_currency(token: &str) -> u64 {
    token
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}
