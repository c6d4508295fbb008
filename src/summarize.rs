//! One-shot entry points: path or URL in, summary out.
//!
//! These wrap a [`SummarizationController`] for callers that do not need an
//! interactive session. PDFium is bound up front here, so a missing library
//! is reported before anything is read or sent.

use crate::config::SummarizerConfig;
use crate::controller::SummarizationController;
use crate::error::SummarizerError;
use crate::output::SummaryReport;
use crate::pipeline::extract::{extract_text_blocking, ExtractedText, TextExtractor};
use crate::pipeline::intake::{self, DocumentHandle};
use crate::pipeline::llm::GeminiClient;
use crate::pipeline::pdfium::PdfiumExtractor;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Bind PDFium according to `config`.
pub fn resolve_extractor(config: &SummarizerConfig) -> Result<Arc<dyn TextExtractor>, SummarizerError> {
    let extractor = PdfiumExtractor::bind(config.pdfium_library_path.as_deref())?;
    Ok(Arc::new(extractor))
}

/// Extract and summarise a PDF file or URL.
///
/// # Errors
/// Intake failures (missing file, failed download), a missing PDFium
/// library, and every controller failure (wrong file type, extraction
/// failure, empty or oversized text, service errors).
pub async fn summarize_file(
    input: impl AsRef<str>,
    config: &SummarizerConfig,
) -> Result<SummaryReport, SummarizerError> {
    let input = input.as_ref();
    info!("Summarizing: {}", input);

    let extractor = resolve_extractor(config)?;
    let document = intake::load_document(input, config.download_timeout_secs).await?;
    summarize_document(document, extractor, config).await
}

/// Extract and summarise an already-loaded document with the given extractor.
pub async fn summarize_document(
    document: DocumentHandle,
    extractor: Arc<dyn TextExtractor>,
    config: &SummarizerConfig,
) -> Result<SummaryReport, SummarizerError> {
    let client = GeminiClient::new(config)?;
    let model = client.model().to_string();
    let mut controller = SummarizationController::new(Some(extractor), Arc::new(client), config);

    let name = document.name().to_string();
    let media_type = document.media_type().to_string();

    let extraction_start = Instant::now();
    let extracted = controller.select_document(document).await?;
    let page_count = extracted.page_count;
    let extracted_chars = extracted.char_count();
    let extraction_ms = extraction_start.elapsed().as_millis() as u64;

    let summary_start = Instant::now();
    let summary = controller.summarize().await?.to_string();
    let summary_ms = summary_start.elapsed().as_millis() as u64;

    Ok(SummaryReport {
        document: name,
        media_type,
        page_count,
        extracted_chars,
        model,
        summary,
        extraction_ms,
        summary_ms,
    })
}

/// Summarise and write the summary text to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn summarize_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &SummarizerConfig,
) -> Result<SummaryReport, SummarizerError> {
    let report = summarize_file(input, config).await?;
    write_atomic(output_path.as_ref(), &report.summary).await?;
    Ok(report)
}

/// Write `contents` to `path` via a sibling temp file and rename.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), SummarizerError> {
    let write_err = |e| SummarizerError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Synchronous wrapper around [`summarize_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    input: impl AsRef<str>,
    config: &SummarizerConfig,
) -> Result<SummaryReport, SummarizerError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummarizerError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize_file(input, config))
}

/// Extract text only. Does not require an API key.
///
/// Unlike the controller, this does not check the declared media type: it is
/// a diagnostic for files the caller already knows to be PDFs.
pub async fn extract_file(
    input: impl AsRef<str>,
    config: &SummarizerConfig,
) -> Result<ExtractedText, SummarizerError> {
    let extractor = resolve_extractor(config)?;
    let document = intake::load_document(input.as_ref(), config.download_timeout_secs).await?;
    extract_text_blocking(extractor, Arc::clone(document.bytes())).await
}
