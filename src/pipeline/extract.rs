//! Text extraction: document bytes → ordered plain text.
//!
//! The extractor is an injected capability ([`TextExtractor`]); this module
//! only defines the seam and the ordering rules. Each page's fragments are
//! joined with a single space and terminated by `\n`; pages are concatenated
//! in increasing page order. Any failure discards the partial text.
//!
//! ```text
//! page 1: ["Hello", "world"]   ─┐
//! page 2: ["Bye"]              ─┴─▶ "Hello world\nBye\n"
//! ```

use crate::error::{ExtractionError, SummarizerError};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A capability that can open document bytes.
///
/// Implementations are shared across threads; extraction runs inside
/// `spawn_blocking`.
pub trait TextExtractor: Send + Sync {
    /// Parse `bytes` into a document whose pages can be read one by one.
    fn load_document<'a>(
        &'a self,
        bytes: &'a [u8],
    ) -> Result<Box<dyn LoadedDocument + 'a>, ExtractionError>;
}

/// An opened document.
pub trait LoadedDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text fragments of a page, in document order. `page_number` is 1-based.
    fn text_fragments(&self, page_number: usize) -> Result<Vec<String>, ExtractionError>;
}

/// The full text of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters, the unit the size guard is expressed in.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Join per-page fragment lists into the final text.
pub fn join_pages<S: AsRef<str>>(pages: &[Vec<S>]) -> String {
    let mut text = String::new();
    for fragments in pages {
        for (i, fragment) in fragments.iter().enumerate() {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(fragment.as_ref());
        }
        text.push('\n');
    }
    text
}

/// Load `bytes` with `extractor` and read every page in order.
pub fn extract_text(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
) -> Result<ExtractedText, ExtractionError> {
    let document = extractor.load_document(bytes)?;
    let page_count = document.page_count();
    debug!("Document loaded: {} pages", page_count);

    let mut pages = Vec::with_capacity(page_count);
    for page_number in 1..=page_count {
        let fragments = document.text_fragments(page_number)?;
        debug!("Page {}: {} fragments", page_number, fragments.len());
        pages.push(fragments);
    }

    Ok(ExtractedText {
        text: join_pages(&pages),
        page_count,
    })
}

/// Run [`extract_text`] on a blocking thread.
///
/// PDF parsing is CPU-bound and the PDFium bindings are synchronous, so the
/// work is moved off the async worker threads.
pub async fn extract_text_blocking(
    extractor: Arc<dyn TextExtractor>,
    bytes: Arc<[u8]>,
) -> Result<ExtractedText, SummarizerError> {
    tokio::task::spawn_blocking(move || extract_text(extractor.as_ref(), &bytes))
        .await
        .map_err(|e| SummarizerError::Internal(format!("Extraction task panicked: {}", e)))?
        .map_err(|source| SummarizerError::ExtractionFailed { source })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPages(Vec<Vec<&'static str>>);

    struct FixedDocument<'a>(&'a [Vec<&'static str>]);

    impl TextExtractor for FixedPages {
        fn load_document<'a>(
            &'a self,
            _bytes: &'a [u8],
        ) -> Result<Box<dyn LoadedDocument + 'a>, ExtractionError> {
            Ok(Box::new(FixedDocument(&self.0)))
        }
    }

    impl LoadedDocument for FixedDocument<'_> {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn text_fragments(&self, page_number: usize) -> Result<Vec<String>, ExtractionError> {
            if page_number == 0 {
                return Err(ExtractionError::Page {
                    page: 0,
                    detail: "pages are 1-based".into(),
                });
            }
            self.0
                .get(page_number - 1)
                .map(|f| f.iter().map(|s| s.to_string()).collect())
                .ok_or(ExtractionError::Page {
                    page: page_number,
                    detail: "out of range".into(),
                })
        }
    }

    struct BrokenPage;

    struct BrokenDocument;

    impl TextExtractor for BrokenPage {
        fn load_document<'a>(
            &'a self,
            _bytes: &'a [u8],
        ) -> Result<Box<dyn LoadedDocument + 'a>, ExtractionError> {
            Ok(Box::new(BrokenDocument))
        }
    }

    impl LoadedDocument for BrokenDocument {
        fn page_count(&self) -> usize {
            3
        }

        fn text_fragments(&self, page_number: usize) -> Result<Vec<String>, ExtractionError> {
            if page_number == 2 {
                Err(ExtractionError::Page {
                    page: 2,
                    detail: "bad content stream".into(),
                })
            } else {
                Ok(vec![format!("page{page_number}")])
            }
        }
    }

    #[test]
    fn two_page_document() {
        let extractor = FixedPages(vec![vec!["Hello", "world"], vec!["Bye"]]);
        let out = extract_text(&extractor, b"%PDF").unwrap();
        assert_eq!(out.text, "Hello world\nBye\n");
        assert_eq!(out.page_count, 2);
    }

    #[test]
    fn empty_pages_still_emit_line_breaks() {
        let extractor = FixedPages(vec![vec![], vec!["only"], vec![]]);
        let out = extract_text(&extractor, b"").unwrap();
        assert_eq!(out.text, "\nonly\n\n");
    }

    #[test]
    fn zero_page_document_is_empty() {
        let extractor = FixedPages(vec![]);
        let out = extract_text(&extractor, b"").unwrap();
        assert!(out.is_empty());
        assert_eq!(out.page_count, 0);
    }

    #[test]
    fn page_failure_discards_partial_text() {
        let err = extract_text(&BrokenPage, b"").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::Page {
                page: 2,
                detail: "bad content stream".into()
            }
        );
    }

    #[test]
    fn join_keeps_page_order() {
        let pages = vec![vec!["a", "b", "c"], vec!["d"], vec!["e", "f"]];
        assert_eq!(join_pages(&pages), "a b c\nd\ne f\n");
    }

    #[test]
    fn char_count_counts_characters_not_bytes() {
        let text = ExtractedText {
            text: "héllo".into(),
            page_count: 1,
        };
        assert_eq!(text.char_count(), 5);
    }

    #[tokio::test]
    async fn blocking_wrapper_maps_failures() {
        let err = extract_text_blocking(Arc::new(BrokenPage), Arc::from(&b"x"[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::ExtractionFailed { .. }));
    }
}
