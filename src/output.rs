//! Result type of the one-shot entry points.

use serde::{Deserialize, Serialize};

/// Everything a caller needs to display or store a finished summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Display name of the document.
    pub document: String,
    /// Media type the document was declared with.
    pub media_type: String,
    pub page_count: usize,
    /// Length of the extracted text, in characters.
    pub extracted_chars: usize,
    pub model: String,
    /// Verbatim text returned by the service.
    pub summary: String,
    pub extraction_ms: u64,
    pub summary_ms: u64,
}
