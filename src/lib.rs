//! # pdf-summarizer
//!
//! Extract the text of a PDF and summarise it with a generative-language API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Intake     local file or URL → DocumentHandle (name, media type, bytes)
//!  ├─ 2. Validate   only `application/pdf` is accepted
//!  ├─ 3. Extract    PDFium text segments, joined per page (spawn_blocking)
//!  ├─ 4. Guard      non-empty and at most `max_text_chars` characters
//!  ├─ 5. Summarise  one `generateContent` request, no retries
//!  └─ 6. Result     verbatim summary, or one fixed human-readable error
//! ```
//!
//! All session state lives in [`SummarizationController`], whose
//! [`Status`] is a single tagged value: idle, busy (extracting or
//! summarizing), error, or ready with a summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_summarizer::{summarize_file, SummarizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizerConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY").unwrap_or_default())
//!         .build()?;
//!     let report = summarize_file("document.pdf", &config).await?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Session API
//!
//! ```rust,no_run
//! use pdf_summarizer::{
//!     load_document, GeminiClient, PdfiumExtractor, SummarizationController,
//!     SummarizerConfig, TextExtractor,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SummarizerConfig::default();
//! // A missing PDFium library is not fatal here: the controller reports it
//! // when the first document is selected.
//! let extractor = PdfiumExtractor::bind(None)
//!     .ok()
//!     .map(|e| Arc::new(e) as Arc<dyn TextExtractor>);
//! let client = Arc::new(GeminiClient::new(&config)?);
//! let mut session = SummarizationController::new(extractor, client, &config);
//!
//! let handle = load_document("document.pdf", 120).await?;
//! if session.select_document(handle).await.is_ok() && session.can_summarize() {
//!     let _ = session.summarize().await;
//! }
//! println!("{:?}", session.status());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsum` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod status;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{SummarizerConfig, SummarizerConfigBuilder};
pub use controller::{
    BusyKind, ExtractionJob, ExtractionOutcome, Status, SummarizationController, SummaryJob,
    SummaryOutcome, Ticket,
};
pub use error::{ExtractionError, SummarizerError};
pub use output::SummaryReport;
pub use pipeline::extract::{extract_text, join_pages, ExtractedText, LoadedDocument, TextExtractor};
pub use pipeline::intake::{load_document, DocumentHandle};
pub use pipeline::llm::{GeminiClient, GenerateOutcome, SummaryBackend};
pub use pipeline::pdfium::PdfiumExtractor;
pub use status::{NoopStatusObserver, SharedStatusObserver, StatusObserver};
pub use summarize::{
    extract_file, resolve_extractor, summarize_document, summarize_file, summarize_sync,
    summarize_to_file,
};
