use std::sync::OnceLock;

use regex::Regex;

use crate::types::UNKNOWN_MERCHANT;

/// Lowercase keyword → canonical brand. Checked in declaration order against
/// the whole OCR text; the first keyword found wins, so new entries must not
/// shadow earlier ones. Legal entity names are listed next to the brand
/// because many receipts print only the company name.
pub const BRANDS: &[(&str, &str)] = &[
    ("indomaret", "INDOMARET"),
    ("indomarco", "INDOMARET"),
    ("alfamart", "ALFAMART"),
    ("sumber alfaria", "ALFAMART"),
    ("alfamidi", "ALFAMIDI"),
    ("midi utama", "ALFAMIDI"),
    ("pertamina", "PERTAMINA"),
    ("shell", "SHELL"),
    ("starbucks", "STARBUCKS"),
    ("mcdonald", "MCDONALD'S"),
    ("kfc", "KFC"),
    ("burger king", "BURGER KING"),
    ("gofood", "GOFOOD"),
    ("grabfood", "GRABFOOD"),
    ("shopeefood", "SHOPEEFOOD"),
    ("solaria", "SOLARIA"),
    ("chatime", "CHATIME"),
    ("janji jiwa", "JANJI JIWA"),
    ("kopi kenangan", "KOPI KENANGAN"),
    ("lawson", "LAWSON"),
    ("superindo", "SUPERINDO"),
    ("hypermart", "HYPERMART"),
    ("familymart", "FAMILYMART"),
];

/// Substrings marking greeting, address, contact and legal header lines.
pub const HEADER_BLACKLIST: &[&str] = &[
    "selamat", "welcome", "datang", "copy", "reprint",
    "jl.", "jalan", "raya", "telp", "phone", "fax", "npwp",
    "jakarta", "indonesia", "cabang", "outlet", "receipt",
    "pt.", "ltd", "tbk", "invoice", "struk",
];

/// Only the top of the receipt is searched for a store name.
pub const FALLBACK_LINE_LIMIT: usize = 5;

/// Lines made only of digits, whitespace and punctuation.
fn re_no_letters() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"^[\d\s\W]+$").expect("invalid regex"))
}

/// Resolve the merchant name. Never fails: falls back to [`UNKNOWN_MERCHANT`].
pub fn resolve_merchant(full_text: &str, lines: &[String]) -> String {
    if let Some(brand) = match_brand(full_text) {
        tracing::debug!(brand, "merchant matched brand dictionary");
        return brand.to_string();
    }

    match header_line(lines) {
        Some(line) => line.to_uppercase(),
        None => UNKNOWN_MERCHANT.to_string(),
    }
}

/// First dictionary brand whose keyword occurs anywhere in `text`.
pub fn match_brand(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BRANDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, brand)| *brand)
}

/// First line near the top that plausibly names the store.
fn header_line(lines: &[String]) -> Option<&str> {
    lines
        .iter()
        .take(FALLBACK_LINE_LIMIT)
        .map(|l| l.trim())
        .filter(|l| l.chars().count() > 3)
        .filter(|l| !re_no_letters().is_match(l))
        .find(|l| {
            let lower = l.to_lowercase();
            !HEADER_BLACKLIST.iter().any(|bad| lower.contains(bad))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::split;

    fn resolve(text: &str) -> String {
        let t = split(text);
        resolve_merchant(&t.full_text, &t.lines)
    }

    #[test]
    fn brand_in_header() {
        assert_eq!(resolve("INDOMARET\nJl. Raya Bogor\nTOTAL 10.000"), "INDOMARET");
    }

    #[test]
    fn legal_name_maps_to_brand_anywhere() {
        let text = "Toko Sebelah\nKasir: Budi\nTOTAL BELANJA 25.000\nPT Sumber Alfaria Trijaya Tbk";
        assert_eq!(resolve(text), "ALFAMART");
    }

    #[test]
    fn brand_match_is_case_insensitive() {
        assert_eq!(resolve("kopi KENANGAN - grand indonesia"), "KOPI KENANGAN");
        assert_eq!(resolve("McDonald's Sarinah"), "MCDONALD'S");
    }

    #[test]
    fn first_dictionary_entry_wins() {
        // Both keywords present: "alfamart" precedes "alfamidi" in the dictionary.
        assert_eq!(resolve("ALFAMIDI\nmember alfamart card"), "ALFAMART");
    }

    #[test]
    fn fallback_skips_address_noise() {
        let text = "Jl. Sudirman No 1\nToko Maju Jaya\nTelp: 021-xxx";
        assert_eq!(resolve(text), "TOKO MAJU JAYA");
    }

    #[test]
    fn fallback_skips_short_and_numeric_lines() {
        let text = "ABC\n12/03/2026 14:05\n*** 001 ***\nWarung Bu Sri\nTOTAL 15.000";
        assert_eq!(resolve(text), "WARUNG BU SRI");
    }

    #[test]
    fn fallback_only_searches_first_five_lines() {
        let text = "Selamat Datang\nJl. Kenanga 3\nTelp 0812\nNPWP 01.234\n0000\nWarung Sate";
        assert_eq!(resolve(text), UNKNOWN_MERCHANT);
    }

    #[test]
    fn unknown_when_no_text() {
        assert_eq!(resolve(""), UNKNOWN_MERCHANT);
    }

    #[test]
    fn blacklist_substring_matches_inside_words() {
        // "raya" inside "Surabaya" is enough to reject the line.
        assert_eq!(resolve("Toko Surabaya\nRumah Makan Padang"), "RUMAH MAKAN PADANG");
    }

    #[test]
    fn resolution_is_deterministic() {
        let t = split("Jl. Mawar\nBengkel Jaya Motor\nTotal 80.000");
        let first = resolve_merchant(&t.full_text, &t.lines);
        for _ in 0..3 {
            assert_eq!(resolve_merchant(&t.full_text, &t.lines), first);
        }
    }
}
