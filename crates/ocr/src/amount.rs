//! Total-amount heuristics.
//!
//! Two passes over the receipt lines:
//!
//! 1. **Priority.** Phrases such as `total belanja` or `jumlah bayar` label the
//!    net payable amount. The first such line holding a plausible number wins,
//!    reading numbers right to left since totals are right-aligned.
//! 2. **Fallback.** Any line with a generic total keyword and no trap keyword
//!    contributes all of its plausible numbers; the largest one wins, since
//!    subtotal and tax lines can also carry the word "total".

use crate::currency::{clean_currency, numeric_tokens};

/// Phrases that label the net amount after discounts.
pub const PRIORITY_KEYWORDS: &[&str] = &[
    "total belanja",
    "total bayar",
    "jumlah bayar",
    "tagihan",
    "harus dibayar",
];

/// Generic total labels used by the fallback pass.
pub const TARGET_KEYWORDS: &[&str] = &[
    "total",
    "jumlah",
    "grand total",
    "amount",
    "harga jual",
    "netto",
    "bayar",
];

/// Lines carrying values that look like totals but are not: tendered cash,
/// change, savings, discounts, tax and item counts.
pub const TRAP_KEYWORDS: &[&str] = &[
    "tunai", "cash", "kembali", "change", "hemat",
    "diskon", "discount", "disc", "potongan",
    "tax", "ppn", "pajak", "item", "qty", "dpp",
];

/// Change-due marker. A priority line mentioning it reports change, not the total.
const CHANGE_KEYWORD: &str = "kembali";

/// Exclusive lower bound; rejects stray digits like quantities.
pub const MIN_PLAUSIBLE: u64 = 100;
/// Exclusive upper bound; rejects misreads such as merged card numbers.
pub const MAX_PLAUSIBLE: u64 = 50_000_000;

pub fn is_plausible(value: u64) -> bool {
    value > MIN_PLAUSIBLE && value < MAX_PLAUSIBLE
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Resolve the grand total in whole Rupiah. Returns 0 when nothing plausible is found.
pub fn resolve_amount(lines: &[String]) -> u64 {
    if let Some(total) = priority_total(lines) {
        tracing::debug!(total, "amount resolved from priority line");
        return total;
    }
    let total = fallback_total(lines).unwrap_or(0);
    tracing::debug!(total, "amount resolved by fallback");
    total
}

/// First plausible right-most number on a line carrying a priority phrase.
///
/// A trap keyword on the same line only disqualifies it when that line reports
/// change (`kembali`); other traps next to a priority phrase are tolerated.
pub fn priority_total(lines: &[String]) -> Option<u64> {
    lines.iter().find_map(|line| {
        let lower = line.to_lowercase();
        if !contains_any(&lower, PRIORITY_KEYWORDS) {
            return None;
        }
        if contains_any(&lower, TRAP_KEYWORDS) && lower.contains(CHANGE_KEYWORD) {
            return None;
        }
        numeric_tokens(line)
            .rev()
            .map(clean_currency)
            .find(|v| is_plausible(*v))
    })
}

/// Largest plausible number on any total-like line free of trap keywords.
pub fn fallback_total(lines: &[String]) -> Option<u64> {
    lines
        .iter()
        .filter(|line| {
            let lower = line.to_lowercase();
            contains_any(&lower, TARGET_KEYWORDS) && !contains_any(&lower, TRAP_KEYWORDS)
        })
        .flat_map(|line| numeric_tokens(line).map(clean_currency))
        .filter(|v| is_plausible(*v))
        .max()
}
