use std::sync::Arc;

use thiserror::Error;

use crate::extract::Extractor;
use crate::hash;
use crate::preprocess::{self, PreprocessError};
use crate::recognizer::{OcrBackend, OcrError, RECEIPT_OCR_PARAMS};
use crate::types::ExtractedReceipt;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR worker failed: {0}")]
    Worker(String),
}

impl PipelineError {
    /// The upload could not be read as an image, or is too large to process.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Preprocess(PreprocessError::Decode(_) | PreprocessError::TooLarge { .. })
                | PipelineError::Ocr(OcrError::ImageDecode(_))
        )
    }
}

/// The result of a single receipt scan.
#[derive(Debug, Clone)]
pub struct ScannedReceipt {
    /// SHA-256 hex digest of the uploaded bytes, for spotting re-uploads.
    pub image_sha256: String,
    /// Raw OCR text output.
    pub ocr_text: String,
    pub receipt: ExtractedReceipt,
}

/// Orchestrates: digest → preprocess → OCR → extract.
///
/// Holds no per-scan state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct ReceiptPipeline {
    recognizer: Arc<dyn OcrBackend>,
}

impl ReceiptPipeline {
    pub fn new(recognizer: impl OcrBackend + 'static) -> Self {
        Self { recognizer: Arc::new(recognizer) }
    }

    pub fn from_arc(recognizer: Arc<dyn OcrBackend>) -> Self {
        Self { recognizer }
    }

    pub fn backend_name(&self) -> &'static str {
        self.recognizer.name()
    }

    /// Scan on the current thread. Blocks for the duration of OCR.
    pub fn scan_blocking(&self, data: &[u8]) -> Result<ScannedReceipt, PipelineError> {
        let image_sha256 = hash::to_hex(&hash::sha256_bytes(data));

        let image = preprocess::normalize_bytes(data)?;
        tracing::debug!(
            digest = %image_sha256,
            width = image.width(),
            height = image.height(),
            "image normalized"
        );

        let ocr_text = self.recognizer.recognize(&image, &RECEIPT_OCR_PARAMS)?;
        let receipt = Extractor::extract(&ocr_text);

        tracing::info!(
            digest = %image_sha256,
            backend = self.recognizer.name(),
            merchant = %receipt.merchant,
            amount = receipt.amount.units(),
            "receipt scanned"
        );

        Ok(ScannedReceipt { image_sha256, ocr_text, receipt })
    }

    /// Scan on the blocking thread pool so OCR does not stall the async executor.
    /// No timeout is applied here; wrap the future if one is needed.
    pub async fn scan(&self, data: Vec<u8>) -> Result<ScannedReceipt, PipelineError> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.scan_blocking(&data))
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))?
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::MockRecognizer;
    use crate::types::UNKNOWN_MERCHANT;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn scan_produces_receipt() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new(
            "INDOMARET\nTOTAL BELANJA 25.000\nTUNAI 30.000\nKEMBALI 5.000",
        ));

        let result = pipeline.scan(tiny_png()).await.unwrap();

        assert_eq!(result.image_sha256.len(), 64);
        assert_eq!(result.receipt.merchant, "INDOMARET");
        assert_eq!(result.receipt.amount.units(), 25_000);
        assert!(result.ocr_text.starts_with("INDOMARET"));
    }

    #[tokio::test]
    async fn digest_is_stable_across_scans() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new("irrelevant"));
        let data = tiny_png();

        let r1 = pipeline.scan(data.clone()).await.unwrap();
        let r2 = pipeline.scan(data).await.unwrap();

        assert_eq!(r1.image_sha256, r2.image_sha256);
        assert_eq!(r1.receipt, r2.receipt);
    }

    #[tokio::test]
    async fn undecodable_bytes_fail_as_decode_error() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new("TOTAL 10.000"));
        let err = pipeline.scan(b"not an image".to_vec()).await.unwrap_err();
        assert!(err.is_decode_failure(), "got {err:?}");
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_before_ocr() {
        let img: GrayImage = ImageBuffer::from_fn(1, preprocess::MAX_SOURCE_SIDE + 1, |_, _| Luma([0u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let pipeline = ReceiptPipeline::new(MockRecognizer::new("TOTAL 10.000"));
        let err = pipeline.scan(buf).await.unwrap_err();
        assert!(
            matches!(err, PipelineError::Preprocess(PreprocessError::TooLarge { .. })),
            "got {err:?}"
        );
        assert!(err.is_decode_failure());
    }

    #[tokio::test]
    async fn engine_failure_surfaces_as_ocr_error() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::failing("tesseract crashed"));
        let err = pipeline.scan(tiny_png()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::Engine(_))));
        assert!(!err.is_decode_failure());
        assert!(err.to_string().contains("tesseract crashed"));
    }

    #[test]
    fn blank_ocr_text_is_low_confidence_not_error() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new(""));
        let result = pipeline.scan_blocking(&tiny_png()).unwrap();
        assert_eq!(result.receipt.merchant, UNKNOWN_MERCHANT);
        assert!(result.receipt.amount.is_zero());
        assert!(result.receipt.needs_review());
    }

    #[tokio::test]
    async fn concurrent_scans_are_independent() {
        let pipeline = ReceiptPipeline::new(MockRecognizer::new("KFC\nTotal 54.000"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = pipeline.clone();
                tokio::spawn(async move { p.scan(tiny_png()).await })
            })
            .collect();
        for h in handles {
            let r = h.await.unwrap().unwrap();
            assert_eq!(r.receipt.merchant, "KFC");
            assert_eq!(r.receipt.amount.units(), 54_000);
        }
    }
}
