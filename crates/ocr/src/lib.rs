pub mod amount;
pub mod currency;
pub mod extract;
pub mod hash;
pub mod lines;
pub mod merchant;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use amount::resolve_amount;
pub use currency::clean_currency;
pub use extract::Extractor;
pub use hash::{sha256_bytes, to_hex};
pub use lines::{split, ReceiptText};
pub use merchant::resolve_merchant;
pub use pipeline::{PipelineError, ReceiptPipeline, ScannedReceipt};
pub use preprocess::{normalize, normalize_bytes, NormalizedImage, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, OcrParams, TesseractCli, RECEIPT_OCR_PARAMS};
pub use types::{ExtractedReceipt, ImageKind, UnsupportedMediaType, UNKNOWN_MERCHANT};

#[cfg(feature = "tesseract")]
pub use recognizer::tesseract_backend::TesseractRecognizer;
