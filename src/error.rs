//! Error types for the pdf-summarizer library.
//!
//! Two error types reflect two layers of the pipeline:
//!
//! * [`SummarizerError`]: every failure the controller or the one-shot entry
//!   points report. Its `Display` output is the fixed, human-readable message
//!   shown to the user (the same string stored in
//!   [`crate::controller::Status::Error`]). Diagnostic detail such as the
//!   PDFium error text lives in separate fields and is only logged.
//!
//! * [`ExtractionError`]: raised by a [`crate::pipeline::extract::TextExtractor`]
//!   while loading a document or reading a page. The controller collapses all
//!   of these into [`SummarizerError::ExtractionFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the selected file is not a PDF.
pub const MSG_INVALID_FILE_TYPE: &str = "Please upload a valid PDF file.";
/// Message shown when no extractor could be resolved at startup.
pub const MSG_EXTRACTOR_UNAVAILABLE: &str =
    "PDF text extraction is not available. Install the PDFium library or set PDFIUM_LIB_PATH.";
/// Message shown for any failure while reading the document.
pub const MSG_EXTRACTION_FAILED: &str =
    "Could not extract text from this PDF. It may be corrupted or password-protected.";
/// Message shown when summarize is requested before any text exists.
pub const MSG_NOTHING_TO_SUMMARIZE: &str = "There is no text to summarize. Upload a PDF first.";
/// Message shown when the extracted text exceeds the configured limit.
pub const MSG_DOCUMENT_TOO_LARGE: &str = "This document is too large to summarize.";
/// Message shown when the service answered with zero candidates.
pub const MSG_NO_CANDIDATES: &str = "No summary was produced.";
/// Message shown for any response shape we do not recognise.
pub const MSG_UNEXPECTED_RESPONSE: &str =
    "Received an unexpected response from the summarization service.";
/// Message shown when the request never completed.
pub const MSG_NETWORK: &str =
    "Could not reach the summarization service. Check your connection and try again.";

/// All errors returned by the pdf-summarizer library.
#[derive(Debug, Error)]
pub enum SummarizerError {
    // ── Invalid input ─────────────────────────────────────────────────────
    /// The selected document does not declare a PDF media type.
    #[error("{}", MSG_INVALID_FILE_TYPE)]
    InvalidFileType { name: String, media_type: String },

    /// Summarize was requested while no text has been extracted.
    #[error("{}", MSG_NOTHING_TO_SUMMARIZE)]
    NothingToSummarize,

    /// Extracted text is longer than `max_text_chars`.
    #[error("{}", MSG_DOCUMENT_TOO_LARGE)]
    DocumentTooLarge { chars: usize, limit: usize },

    /// An extraction or summarization is already in flight.
    #[error("Another operation is still in progress.")]
    Busy,

    // ── Extraction ────────────────────────────────────────────────────────
    /// No text extractor was injected (PDFium could not be bound).
    #[error("{}", MSG_EXTRACTOR_UNAVAILABLE)]
    ExtractorUnavailable { detail: String },

    /// Loading the document or reading one of its pages failed.
    #[error("{}", MSG_EXTRACTION_FAILED)]
    ExtractionFailed {
        #[source]
        source: ExtractionError,
    },

    // ── Remote service ────────────────────────────────────────────────────
    /// The service returned an explicit error object; the message is surfaced verbatim.
    #[error("{message}")]
    ApiError { message: String },

    /// The prompt was rejected by the service's content-safety filter.
    #[error("The request was blocked: {reason}")]
    Blocked { reason: String },

    /// The service answered successfully but with zero candidates.
    #[error("{}", MSG_NO_CANDIDATES)]
    NoCandidates,

    /// The response did not match any known shape.
    #[error("{}", MSG_UNEXPECTED_RESPONSE)]
    UnexpectedResponse { detail: String },

    /// The request itself failed (DNS, TLS, connection reset, timeout…).
    #[error("{}", MSG_NETWORK)]
    Network { detail: String },

    // ── Document intake ───────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Output / config ───────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SummarizerError {
    /// True for failures reported by (or while reaching) the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::ApiError { .. }
                | Self::Blocked { .. }
                | Self::NoCandidates
                | Self::UnexpectedResponse { .. }
                | Self::Network { .. }
        )
    }
}

/// A failure raised by a text extractor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// The bytes could not be parsed as a document.
    #[error("document could not be loaded: {detail}")]
    Load { detail: String },

    /// The document is encrypted.
    #[error("document is password-protected")]
    PasswordProtected,

    /// A page could not be opened or its text could not be read.
    #[error("page {page}: {detail}")]
    Page { page: usize, detail: String },
}
