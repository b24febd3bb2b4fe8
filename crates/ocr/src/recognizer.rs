use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::preprocess::NormalizedImage;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR engine not available: {0}")]
    NotAvailable(String),
}

/// Engine settings passed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrParams {
    /// Tesseract language pack.
    pub language: &'static str,
    /// Tesseract `--psm` page segmentation mode.
    pub page_seg_mode: u8,
    /// Tesseract `--oem` engine mode.
    pub engine_mode: u8,
}

/// Indonesian, whole image treated as one uniform block of text (`--psm 6`),
/// default engine (`--oem 3`). Not tunable per request.
pub const RECEIPT_OCR_PARAMS: OcrParams = OcrParams {
    language: "ind",
    page_seg_mode: 6,
    engine_mode: 3,
};

/// Abstraction over an OCR backend.
/// Implementations may block; callers run them off the async executor.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image: &NormalizedImage, params: &OcrParams) -> Result<String, OcrError>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set string (or a pre-set failure). Useful for testing the
/// extraction pipeline without requiring Tesseract to be installed.
pub struct MockRecognizer {
    outcome: Result<String, String>,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { outcome: Ok(text.into()) }
    }

    /// A recognizer whose engine always errors with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()) }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image: &NormalizedImage, _params: &OcrParams) -> Result<String, OcrError> {
        self.outcome.clone().map_err(OcrError::Engine)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ── Tesseract executable ──────────────────────────────────────────────────────

/// Runs the `tesseract` command-line tool, piping a PNG over stdin and
/// reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractCli {
    /// `command` is the executable path; a bare `tesseract` is resolved via `PATH`.
    pub fn new(command: impl Into<PathBuf>, tessdata_dir: Option<PathBuf>) -> Self {
        Self { command: command.into(), tessdata_dir }
    }

    fn args(&self, params: &OcrParams) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(dir) = &self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        args.extend([
            "-l".to_string(),
            params.language.to_string(),
            "--oem".to_string(),
            params.engine_mode.to_string(),
            "--psm".to_string(),
            params.page_seg_mode.to_string(),
        ]);
        args
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract", None)
    }
}

impl OcrBackend for TesseractCli {
    fn recognize(&self, image: &NormalizedImage, params: &OcrParams) -> Result<String, OcrError> {
        let png = image.to_png().map_err(|e| OcrError::ImageDecode(e.to_string()))?;

        let mut child = Command::new(&self.command)
            .args(self.args(params))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    OcrError::NotAvailable(format!("{} not found", self.command.display()))
                }
                _ => OcrError::Engine(format!("failed to start {}: {e}", self.command.display())),
            })?;

        // Tesseract reads the whole image before writing anything, so writing
        // stdin to completion first cannot deadlock on a full stdout pipe.
        // The child is always waited on, even when the write fails, so it is
        // reaped and its stderr is kept. A broken pipe means the engine exited
        // early; its exit status and stderr carry the real cause.
        let written = match child.stdin.take() {
            Some(mut stdin) => match stdin.write_all(&png) {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                other => other,
            },
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Engine(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| OcrError::Engine(format!("failed to write image: {e}")))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &'static str {
        "tesseract-cli"
    }
}

// ── libtesseract backend (optional, gated behind `tesseract` feature) ─────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, OcrParams};
    use crate::preprocess::NormalizedImage;
    use leptess::{LepTess, Variable};

    pub struct TesseractRecognizer {
        data_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>) -> Self {
            Self { data_path }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image: &NormalizedImage, params: &OcrParams) -> Result<String, OcrError> {
            let png = image.to_png().map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let mut lt = LepTess::new(self.data_path.as_deref(), params.language)
                .map_err(|e| OcrError::NotAvailable(e.to_string()))?;
            lt.set_variable(Variable::TesseditPagesegMode, &params.page_seg_mode.to_string())
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(&png)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }

        fn name(&self) -> &'static str {
            "libtesseract"
        }
    }
}
