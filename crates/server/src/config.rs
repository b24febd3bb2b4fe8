use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dompet_ocr::{MockRecognizer, OcrBackend, TesseractCli};
use serde::Deserialize;
use thiserror::Error;

/// Consulted when `DOMPET_CONFIG` is unset; missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "dompet.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },
    #[error("Invalid CORS origin: '{0}'")]
    InvalidOrigin(String),
    #[error("OCR backend '{0}' is not compiled in; rebuild with the `tesseract` feature")]
    BackendUnavailable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OcrBackendKind {
    /// The `tesseract` executable.
    TesseractCli,
    /// libtesseract linked in-process (`tesseract` feature).
    Libtesseract,
    /// Returns empty text; for running the server without an engine.
    Mock,
}

impl std::str::FromStr for OcrBackendKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tesseract-cli" => Ok(OcrBackendKind::TesseractCli),
            "libtesseract" => Ok(OcrBackendKind::Libtesseract),
            "mock" => Ok(OcrBackendKind::Mock),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub backend: OcrBackendKind,
    /// Executable for the CLI backend. On Windows this is typically
    /// `C:\Program Files\Tesseract-OCR\tesseract.exe`.
    pub tesseract_cmd: PathBuf,
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendKind::TesseractCli,
            tesseract_cmd: PathBuf::from("tesseract"),
            tessdata_dir: None,
        }
    }
}

impl OcrConfig {
    /// Build the configured engine binding. Done once at startup.
    pub fn build_backend(&self) -> Result<Arc<dyn OcrBackend>, ConfigError> {
        match self.backend {
            OcrBackendKind::TesseractCli => Ok(Arc::new(TesseractCli::new(
                self.tesseract_cmd.clone(),
                self.tessdata_dir.clone(),
            ))),
            OcrBackendKind::Mock => Ok(Arc::new(MockRecognizer::new(""))),
            #[cfg(feature = "tesseract")]
            OcrBackendKind::Libtesseract => Ok(Arc::new(dompet_ocr::TesseractRecognizer::new(
                self.tessdata_dir.as_ref().map(|p| p.display().to_string()),
            ))),
            #[cfg(not(feature = "tesseract"))]
            OcrBackendKind::Libtesseract => Err(ConfigError::BackendUnavailable("libtesseract")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub ocr: OcrConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_format: LogFormat::Pretty,
            cors_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: 10 * 1024 * 1024,
            ocr: OcrConfig::default(),
        }
    }
}

impl ServerConfig {
    /// File (from `DOMPET_CONFIG`, else `dompet.toml` if present), then
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os("DOMPET_CONFIG").map(PathBuf::from);
        let config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DOMPET_*` overrides looked up through `var`.
    pub fn with_env_overrides(
        mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value })
        }

        if let Some(v) = var("DOMPET_BIND_ADDR") {
            self.bind_addr = parse("DOMPET_BIND_ADDR", v)?;
        }
        if let Some(v) = var("DOMPET_LOG_FORMAT") {
            self.log_format = parse("DOMPET_LOG_FORMAT", v)?;
        }
        if let Some(v) = var("DOMPET_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse("DOMPET_MAX_UPLOAD_BYTES", v)?;
        }
        if let Some(v) = var("DOMPET_CORS_ORIGINS") {
            self.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = var("DOMPET_OCR_BACKEND") {
            self.ocr.backend = parse("DOMPET_OCR_BACKEND", v)?;
        }
        if let Some(v) = var("DOMPET_TESSERACT_CMD") {
            self.ocr.tesseract_cmd = PathBuf::from(v);
        }
        if let Some(v) = var("DOMPET_TESSDATA_DIR") {
            self.ocr.tessdata_dir = Some(PathBuf::from(v));
        }
        Ok(self)
    }
}
