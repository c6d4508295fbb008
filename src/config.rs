//! Configuration for PDF summarisation.
//!
//! Every knob lives in [`SummarizerConfig`], built via its
//! [`SummarizerConfigBuilder`]. The CLI maps its flags and environment
//! variables onto the builder; library callers set only what they need.

use crate::error::SummarizerError;
use crate::prompts::DEFAULT_INSTRUCTION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default generative-language model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API root; the model and method are appended per request.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upper bound on extracted text, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 100_000;

/// Configuration for a summarisation session.
///
/// # Example
/// ```rust
/// use pdf_summarizer::SummarizerConfig;
///
/// let config = SummarizerConfig::builder()
///     .model("gemini-2.0-flash")
///     .max_text_chars(50_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_text_chars, 50_000);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Access credential appended to the endpoint URL. `None` sends an empty key;
    /// key management belongs to the hosting environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// API root without trailing slash. Default: [`DEFAULT_API_BASE_URL`].
    pub api_base_url: String,

    /// Longest extracted text (in characters) that may be sent. Default: 100 000.
    ///
    /// A client-side guard only; the service enforces its own limits.
    pub max_text_chars: usize,

    /// Instruction placed in front of the extracted text.
    pub instruction: String,

    /// Request timeout in seconds. Default: `None` (transport default).
    pub request_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Path to the PDFium shared library, or the directory holding it.
    /// `None` searches the system library path.
    pub pdfium_library_path: Option<PathBuf>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            instruction: DEFAULT_INSTRUCTION.to_string(),
            request_timeout_secs: None,
            download_timeout_secs: 120,
            pdfium_library_path: None,
        }
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("max_text_chars", &self.max_text_chars)
            .field("instruction", &self.instruction)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .finish()
    }
}

impl SummarizerConfig {
    /// Create a new builder for `SummarizerConfig`.
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummarizerConfig`].
#[derive(Debug)]
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_text_chars(mut self, n: usize) -> Self {
        self.config.max_text_chars = n;
        self
    }

    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = instruction.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizerConfig, SummarizerError> {
        let c = &self.config;
        if c.max_text_chars == 0 {
            return Err(SummarizerError::InvalidConfig(
                "max_text_chars must be ≥ 1".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(SummarizerError::InvalidConfig("model must not be empty".into()));
        }
        if c.instruction.trim().is_empty() {
            return Err(SummarizerError::InvalidConfig(
                "instruction must not be empty".into(),
            ));
        }
        match reqwest::Url::parse(&c.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(SummarizerError::InvalidConfig(format!(
                    "api_base_url must be an http(s) URL, got '{}'",
                    c.api_base_url
                )))
            }
        }
        if c.request_timeout_secs == Some(0) {
            return Err(SummarizerError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
