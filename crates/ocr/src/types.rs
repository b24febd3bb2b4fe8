use chrono::NaiveDate;
use dompet_core::{Rupiah, TransactionDraft};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when no brand matches and no header line looks like a store name.
pub const UNKNOWN_MERCHANT: &str = "UNKNOWN MERCHANT";

/// Image encodings accepted for scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported media type: '{0}' (expected image/jpeg or image/png)")]
pub struct UnsupportedMediaType(pub String);

impl ImageKind {
    /// Map a declared MIME type onto a supported encoding. Parameters after
    /// `;` are ignored.
    pub fn from_mime(mime: &str) -> Result<ImageKind, UnsupportedMediaType> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Ok(ImageKind::Jpeg),
            "image/png" => Ok(ImageKind::Png),
            _ => Err(UnsupportedMediaType(mime.to_string())),
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageKind::Jpeg => write!(f, "image/jpeg"),
            ImageKind::Png => write!(f, "image/png"),
        }
    }
}

/// Merchant and total read from a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    pub merchant: String,
    /// Grand total in whole Rupiah; zero when no plausible total was found.
    pub amount: Rupiah,
}

impl ExtractedReceipt {
    /// Heuristic fallbacks were hit; the user should confirm before saving.
    pub fn needs_review(&self) -> bool {
        self.merchant == UNKNOWN_MERCHANT || self.amount.is_zero()
    }

    /// Pre-fill an expense from this receipt. The unknown-merchant sentinel is
    /// not carried into the description.
    pub fn to_draft(&self, date: NaiveDate) -> TransactionDraft {
        let description = if self.merchant == UNKNOWN_MERCHANT || self.merchant.is_empty() {
            None
        } else {
            Some(self.merchant.clone())
        };
        TransactionDraft::expense(self.amount, date, description)
    }
}
