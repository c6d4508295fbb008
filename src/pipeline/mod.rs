//! Pipeline stages for PDF summarisation.
//!
//! Each submodule implements one step; the controller strings them together.
//!
//! ## Data Flow
//!
//! ```text
//! intake ──▶ extract ──▶ llm
//! (path/URL)  (pdfium)   (generateContent)
//! ```
//!
//! 1. [`intake`]: read a local file or download a URL into a
//!    [`intake::DocumentHandle`] with its declared media type
//! 2. [`extract`]: the [`extract::TextExtractor`] seam and the page/fragment
//!    joining rules; runs in `spawn_blocking`
//! 3. [`pdfium`]: the production extractor, bound at startup
//! 4. [`llm`]: the [`llm::SummaryBackend`] seam, the typed response
//!    schema and the HTTP client; the only stage that talks to the service

pub mod extract;
pub mod intake;
pub mod llm;
pub mod pdfium;
