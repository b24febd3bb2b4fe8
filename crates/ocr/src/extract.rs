use dompet_core::Rupiah;

use crate::amount::resolve_amount;
use crate::lines;
use crate::merchant::resolve_merchant;
use crate::types::ExtractedReceipt;

pub struct Extractor;

impl Extractor {
    /// Extract merchant and total from raw OCR text. Never fails; heuristic
    /// misses surface as the unknown-merchant sentinel or a zero amount.
    pub fn extract(ocr_text: &str) -> ExtractedReceipt {
        let text = lines::split(ocr_text);
        tracing::debug!(lines = text.lines.len(), "extracting receipt fields");

        let merchant = resolve_merchant(&text.full_text, &text.lines);
        let amount = Rupiah::from(resolve_amount(&text.lines));

        ExtractedReceipt { merchant, amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_MERCHANT;

    #[test]
    fn alfamart_receipt() {
        let text = "\
ALFAMART
PT SUMBER ALFARIA TRIJAYA, TBK
JL. M.H. THAMRIN NO. 9
NPWP 01.336.238.9-054.000
AQUA 600ML        2    7.000
INDOMIE GRG       5   15.500
Total Item 7
HARGA JUAL     :   22.500
Disc.          :    1.000
TOTAL BELANJA  :   21.500
TUNAI          :   50.000
KEMBALI        :   28.500
PPN            :    2.130
";
        let r = Extractor::extract(text);
        assert_eq!(r.merchant, "ALFAMART");
        assert_eq!(r.amount.units(), 21_500);
        assert!(!r.needs_review());
    }

    #[test]
    fn independent_shop_receipt() {
        let text = "\
Jl. Sudirman No 1
Toko Maju Jaya
Telp: 021-5550101
Beras 5kg      68.000
Minyak 2L      34.000
Subtotal      102.000
Total         102.000
Tunai         110.000
";
        let r = Extractor::extract(text);
        assert_eq!(r.merchant, "TOKO MAJU JAYA");
        assert_eq!(r.amount.units(), 102_000);
    }

    #[test]
    fn unreadable_receipt_needs_review() {
        let r = Extractor::extract("~~ ## ~~\n123\n");
        assert_eq!(r.merchant, UNKNOWN_MERCHANT);
        assert!(r.amount.is_zero());
        assert!(r.needs_review());
    }

    #[test]
    fn empty_text() {
        let r = Extractor::extract("");
        assert_eq!(r.merchant, UNKNOWN_MERCHANT);
        assert!(r.amount.is_zero());
    }

    #[test]
    fn no_panic_on_garbage_input() {
        let _ = Extractor::extract("!@#$%^&*()\n\0\x01\x02\n9999999999999999999999999 total");
    }
}
