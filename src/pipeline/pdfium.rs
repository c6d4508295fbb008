//! PDFium-backed [`TextExtractor`].
//!
//! The library is bound once at startup by [`PdfiumExtractor::bind`]. A
//! failed bind is reported as [`SummarizerError::ExtractorUnavailable`]; the
//! caller decides whether that is fatal (the one-shot API) or a state the
//! controller reports on the first extraction (the CLI and session API).
//!
//! Fragments are PDFium text segments: runs of characters sharing a baseline
//! and font, in content-stream order.

use crate::error::{ExtractionError, SummarizerError};
use crate::pipeline::extract::{LoadedDocument, TextExtractor};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Text extractor backed by a bound PDFium library.
pub struct PdfiumExtractor {
    pdfium: Pdfium,
}

impl PdfiumExtractor {
    /// Bind to PDFium.
    ///
    /// `library_path` may point at the shared library itself or at the
    /// directory containing it. `None` searches the system library path.
    pub fn bind(library_path: Option<&Path>) -> Result<Self, SummarizerError> {
        let bindings = match library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| SummarizerError::ExtractorUnavailable {
            detail: e.to_string(),
        })?;

        info!(
            "PDFium bound ({})",
            library_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "system library".to_string())
        );
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl TextExtractor for PdfiumExtractor {
    fn load_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn LoadedDocument + 'a>, ExtractionError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| {
                let detail = format!("{:?}", e);
                warn!("PDFium could not load document: {}", detail);
                if detail.contains("Password") || detail.contains("password") {
                    ExtractionError::PasswordProtected
                } else {
                    ExtractionError::Load { detail }
                }
            })?;

        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl LoadedDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn text_fragments(&self, page_number: usize) -> Result<Vec<String>, ExtractionError> {
        let index = page_number
            .checked_sub(1)
            .and_then(|i| PdfPageIndex::try_from(i).ok())
            .ok_or_else(|| ExtractionError::Page {
                page: page_number,
                detail: "page number out of range".into(),
            })?;

        let page = self
            .document
            .pages()
            .get(index)
            .map_err(|e| ExtractionError::Page {
                page: page_number,
                detail: format!("{:?}", e),
            })?;

        let text = page.text().map_err(|e| ExtractionError::Page {
            page: page_number,
            detail: format!("{:?}", e),
        })?;

        let fragments: Vec<String> = text
            .segments()
            .iter()
            .map(|segment| segment.text())
            .collect();
        debug!("Page {}: {} segments", page_number, fragments.len());
        Ok(fragments)
    }
}
