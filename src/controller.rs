//! The summarisation session: one document, its text, and a single status.
//!
//! [`SummarizationController`] owns all session state and is the only place
//! it changes. Status is one tagged value, so "busy and showing an error" or
//! "summary present while extracting" cannot be represented.
//!
//! ```text
//!            select (pdf)                 ok
//!   Idle ─────────────────▶ Busy(Extracting) ───▶ Idle
//!    ▲ │                          │ err
//!    │ │ select (not pdf)         ▼
//!    │ └────────────────────▶ Error ◀─────────────┐
//!    │                          │ summarize       │ err
//!    │ summarize                ▼                 │
//!    └──────────────────▶ Busy(Summarizing) ──────┘
//!                               │ ok
//!                               ▼
//!                        Ready { summary }
//! ```
//!
//! ## Two-phase operations
//!
//! Each operation is split into `begin_*` (synchronous state transition that
//! returns a job) and `complete_*` (applies the job's outcome). Every `begin_*`
//! bumps a generation counter and stamps the job with a [`Ticket`]; an outcome
//! whose ticket is no longer current is dropped. A result from a superseded
//! document therefore never overwrites the state of the current one.
//!
//! [`SummarizationController::select_document`] and
//! [`SummarizationController::summarize`] run both phases back to back.

use crate::config::SummarizerConfig;
use crate::error::SummarizerError;
use crate::pipeline::extract::{extract_text_blocking, ExtractedText, TextExtractor};
use crate::pipeline::intake::DocumentHandle;
use crate::pipeline::llm::SummaryBackend;
use crate::prompts::build_prompt;
use crate::status::{NoopStatusObserver, SharedStatusObserver};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which long-running operation is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyKind {
    Extracting,
    Summarizing,
}

/// Controller status. Exactly one is active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Idle,
    Busy(BusyKind),
    Error { message: String },
    Ready { summary: String },
}

impl Status {
    pub fn is_busy(&self) -> bool {
        matches!(self, Status::Busy(_))
    }

    pub fn busy_kind(&self) -> Option<BusyKind> {
        match self {
            Status::Busy(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Status::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            Status::Ready { summary } => Some(summary),
            _ => None,
        }
    }

    /// Short lowercase name, for logs and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Busy(BusyKind::Extracting) => "extracting",
            Status::Busy(BusyKind::Summarizing) => "summarizing",
            Status::Error { .. } => "error",
            Status::Ready { .. } => "ready",
        }
    }
}

/// Generation stamp carried by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Pending text extraction for an accepted document.
pub struct ExtractionJob {
    ticket: Ticket,
    bytes: Arc<[u8]>,
    extractor: Option<Arc<dyn TextExtractor>>,
}

/// Result of an [`ExtractionJob`].
pub struct ExtractionOutcome {
    pub ticket: Ticket,
    pub result: Result<ExtractedText, SummarizerError>,
}

impl ExtractionJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Run the extraction. Never retries.
    pub async fn run(self) -> ExtractionOutcome {
        let result = match self.extractor {
            Some(extractor) => extract_text_blocking(extractor, self.bytes).await,
            None => Err(SummarizerError::ExtractorUnavailable {
                detail: "no text extractor configured".into(),
            }),
        };
        ExtractionOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Pending summarisation request.
pub struct SummaryJob {
    ticket: Ticket,
    prompt: String,
    backend: Arc<dyn SummaryBackend>,
}

/// Result of a [`SummaryJob`].
pub struct SummaryOutcome {
    pub ticket: Ticket,
    pub result: Result<String, SummarizerError>,
}

impl SummaryJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Perform the single network round-trip.
    pub async fn run(self) -> SummaryOutcome {
        let result = self.backend.generate(&self.prompt).await;
        SummaryOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Owns the session state and drives intake → extraction → summarisation.
pub struct SummarizationController {
    extractor: Option<Arc<dyn TextExtractor>>,
    backend: Arc<dyn SummaryBackend>,
    observer: SharedStatusObserver,
    max_text_chars: usize,
    instruction: String,
    document: Option<DocumentHandle>,
    extracted: ExtractedText,
    status: Status,
    generation: u64,
}

impl SummarizationController {
    /// Create a controller. `extractor` is `None` when no extraction
    /// capability could be resolved; extraction then fails with
    /// [`SummarizerError::ExtractorUnavailable`].
    pub fn new(
        extractor: Option<Arc<dyn TextExtractor>>,
        backend: Arc<dyn SummaryBackend>,
        config: &SummarizerConfig,
    ) -> Self {
        Self {
            extractor,
            backend,
            observer: Arc::new(NoopStatusObserver),
            max_text_chars: config.max_text_chars,
            instruction: config.instruction.clone(),
            document: None,
            extracted: ExtractedText::default(),
            status: Status::Idle,
            generation: 0,
        }
    }

    pub fn with_observer(mut self, observer: SharedStatusObserver) -> Self {
        self.observer = observer;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn extracted(&self) -> &ExtractedText {
        &self.extracted
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted.text
    }

    pub fn summary(&self) -> Option<&str> {
        self.status.summary()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.error_message()
    }

    /// Whether the summarize action is enabled: text present and nothing in flight.
    pub fn can_summarize(&self) -> bool {
        !self.is_busy() && has_text(&self.extracted)
    }

    // ── Document selection ───────────────────────────────────────────────

    /// Validate and accept `handle`, moving to `Busy(Extracting)`.
    ///
    /// A non-PDF handle is discarded together with any previous text and
    /// summary, and the controller moves to `Error`.
    pub fn begin_selection(
        &mut self,
        handle: DocumentHandle,
    ) -> Result<ExtractionJob, SummarizerError> {
        self.generation += 1;
        self.extracted = ExtractedText::default();

        if !handle.is_pdf() {
            self.document = None;
            return Err(self.fail(SummarizerError::InvalidFileType {
                name: handle.name().to_string(),
                media_type: handle.media_type().to_string(),
            }));
        }

        info!(
            "Accepted document '{}' ({} bytes)",
            handle.name(),
            handle.len()
        );
        let bytes = Arc::clone(handle.bytes());
        self.document = Some(handle);
        self.set_status(Status::Busy(BusyKind::Extracting));

        Ok(ExtractionJob {
            ticket: Ticket(self.generation),
            bytes,
            extractor: self.extractor.clone(),
        })
    }

    /// Apply an extraction outcome.
    ///
    /// Returns `Ok(false)` when the outcome was stale and ignored, `Ok(true)`
    /// when text was stored, and the error when extraction failed (already
    /// recorded in the status).
    pub fn complete_extraction(
        &mut self,
        outcome: ExtractionOutcome,
    ) -> Result<bool, SummarizerError> {
        if !self.is_current(outcome.ticket, BusyKind::Extracting) {
            debug!("Ignoring stale extraction result {:?}", outcome.ticket);
            return Ok(false);
        }

        match outcome.result {
            Ok(extracted) => {
                info!(
                    "Extracted {} chars from {} pages",
                    extracted.char_count(),
                    extracted.page_count
                );
                self.extracted = extracted;
                self.set_status(Status::Idle);
                Ok(true)
            }
            Err(e) => {
                self.extracted = ExtractedText::default();
                Err(self.fail(e))
            }
        }
    }

    /// Accept `handle` and extract its text.
    pub async fn select_document(
        &mut self,
        handle: DocumentHandle,
    ) -> Result<&ExtractedText, SummarizerError> {
        let job = self.begin_selection(handle)?;
        let outcome = job.run().await;
        self.complete_extraction(outcome)?;
        Ok(&self.extracted)
    }

    // ── Summarisation ────────────────────────────────────────────────────

    /// Check preconditions and move to `Busy(Summarizing)`.
    ///
    /// No request is prepared when the text is empty or too long; those
    /// failures move the controller to `Error`. While busy the call is
    /// refused without touching the state.
    pub fn begin_summary(&mut self) -> Result<SummaryJob, SummarizerError> {
        if self.is_busy() {
            debug!("Summarize ignored while {}", self.status.label());
            return Err(SummarizerError::Busy);
        }
        if !has_text(&self.extracted) {
            return Err(self.fail(SummarizerError::NothingToSummarize));
        }
        let chars = self.extracted.char_count();
        if chars > self.max_text_chars {
            return Err(self.fail(SummarizerError::DocumentTooLarge {
                chars,
                limit: self.max_text_chars,
            }));
        }

        self.generation += 1;
        self.set_status(Status::Busy(BusyKind::Summarizing));
        info!("Requesting summary of {} chars", chars);

        Ok(SummaryJob {
            ticket: Ticket(self.generation),
            prompt: build_prompt(&self.instruction, &self.extracted.text),
            backend: Arc::clone(&self.backend),
        })
    }

    /// Apply a summarisation outcome. Same return contract as
    /// [`Self::complete_extraction`].
    pub fn complete_summary(&mut self, outcome: SummaryOutcome) -> Result<bool, SummarizerError> {
        if !self.is_current(outcome.ticket, BusyKind::Summarizing) {
            debug!("Ignoring stale summary result {:?}", outcome.ticket);
            return Ok(false);
        }

        match outcome.result {
            Ok(summary) => {
                self.set_status(Status::Ready { summary });
                Ok(true)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Summarise the extracted text with one request.
    pub async fn summarize(&mut self) -> Result<&str, SummarizerError> {
        let job = self.begin_summary()?;
        let outcome = job.run().await;
        self.complete_summary(outcome)?;
        Ok(self.status.summary().unwrap_or_default())
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn is_current(&self, ticket: Ticket, kind: BusyKind) -> bool {
        ticket == Ticket(self.generation) && self.status.busy_kind() == Some(kind)
    }

    fn set_status(&mut self, next: Status) {
        let previous = std::mem::replace(&mut self.status, next);
        debug!("Status: {} -> {}", previous.label(), self.status.label());
        self.observer.on_status_change(&previous, &self.status);
    }

    /// Record `err` as the current error and hand it back to the caller.
    fn fail(&mut self, err: SummarizerError) -> SummarizerError {
        match std::error::Error::source(&err) {
            Some(source) => warn!("{} ({})", err, source),
            None => warn!("{} ({:?})", err, err),
        }
        self.set_status(Status::Error {
            message: err.to_string(),
        });
        err
    }
}

fn has_text(extracted: &ExtractedText) -> bool {
    !extracted.text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, MSG_INVALID_FILE_TYPE, MSG_NOTHING_TO_SUMMARIZE};
    use crate::pipeline::extract::LoadedDocument;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OnePage(&'static str);

    struct OnePageDoc(&'static str);

    impl TextExtractor for OnePage {
        fn load_document<'a>(
            &'a self,
            _bytes: &'a [u8],
        ) -> Result<Box<dyn LoadedDocument + 'a>, ExtractionError> {
            Ok(Box::new(OnePageDoc(self.0)))
        }
    }

    impl LoadedDocument for OnePageDoc {
        fn page_count(&self) -> usize {
            1
        }

        fn text_fragments(&self, _page_number: usize) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0.split(' ').map(str::to_string).collect())
        }
    }

    struct Echo(AtomicUsize);

    impl SummaryBackend for Echo {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
        ) -> BoxFuture<'a, Result<String, SummarizerError>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let last = prompt.lines().last().unwrap_or_default().to_string();
            Box::pin(async move { Ok(format!("summary of {last}")) })
        }
    }

    fn controller(text: &'static str) -> (SummarizationController, Arc<Echo>) {
        let backend = Arc::new(Echo(AtomicUsize::new(0)));
        let c = SummarizationController::new(
            Some(Arc::new(OnePage(text))),
            backend.clone(),
            &SummarizerConfig::default(),
        );
        (c, backend)
    }

    fn pdf(name: &str) -> DocumentHandle {
        DocumentHandle::new(name, "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn starts_idle_and_disabled() {
        let (c, _) = controller("x");
        assert_eq!(c.status(), &Status::Idle);
        assert!(!c.can_summarize());
        assert!(c.document().is_none());
    }

    #[test]
    fn begin_selection_goes_busy() {
        let (mut c, _) = controller("x");
        let _job = c.begin_selection(pdf("a.pdf")).unwrap();
        assert_eq!(c.status(), &Status::Busy(BusyKind::Extracting));
        assert!(!c.can_summarize());
    }

    #[test]
    fn non_pdf_is_rejected_and_not_retained() {
        let (mut c, _) = controller("x");
        let handle = DocumentHandle::new("notes.txt", "text/plain", b"hi".to_vec());
        let err = c.begin_selection(handle).err().unwrap();
        assert!(matches!(err, SummarizerError::InvalidFileType { .. }));
        assert_eq!(c.error_message(), Some(MSG_INVALID_FILE_TYPE));
        assert!(c.document().is_none());
        assert!(c.extracted_text().is_empty());
    }

    #[test]
    fn stale_extraction_is_ignored() {
        tokio_test::block_on(async {
            let (mut c, _) = controller("first second");
            let old_job = c.begin_selection(pdf("old.pdf")).unwrap();
            let new_job = c.begin_selection(pdf("new.pdf")).unwrap();
            assert_ne!(old_job.ticket(), new_job.ticket());

            let new_outcome = new_job.run().await;
            let old_outcome = old_job.run().await;

            assert!(c.complete_extraction(new_outcome).unwrap());
            assert!(!c.complete_extraction(old_outcome).unwrap());
            assert_eq!(c.document().map(|d| d.name()), Some("new.pdf"));
            assert_eq!(c.extracted_text(), "first second\n");
            assert_eq!(c.status(), &Status::Idle);
        });
    }

    #[test]
    fn selection_supersedes_in_flight_summary() {
        tokio_test::block_on(async {
            let (mut c, _) = controller("body");
            c.select_document(pdf("a.pdf")).await.unwrap();
            let summary_job = c.begin_summary().unwrap();

            c.select_document(pdf("b.pdf")).await.unwrap();
            let late = summary_job.run().await;
            assert!(!c.complete_summary(late).unwrap());
            assert_eq!(c.status(), &Status::Idle);
            assert!(c.summary().is_none());
        });
    }

    #[test]
    fn summarize_refused_while_busy() {
        let (mut c, backend) = controller("x");
        let _job = c.begin_selection(pdf("a.pdf")).unwrap();
        let err = c.begin_summary().err().unwrap();
        assert!(matches!(err, SummarizerError::Busy));
        assert_eq!(c.status(), &Status::Busy(BusyKind::Extracting));
        assert_eq!(backend.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn whitespace_only_text_is_nothing_to_summarize() {
        tokio_test::block_on(async {
            let (mut c, backend) = controller(" ");
            c.select_document(pdf("blank.pdf")).await.unwrap();
            assert!(!c.can_summarize());
            let err = c.summarize().await.unwrap_err();
            assert!(matches!(err, SummarizerError::NothingToSummarize));
            assert_eq!(c.error_message(), Some(MSG_NOTHING_TO_SUMMARIZE));
            assert_eq!(backend.0.load(Ordering::SeqCst), 0);
        });
    }

    #[test]
    fn resummarize_from_ready() {
        tokio_test::block_on(async {
            let (mut c, backend) = controller("alpha beta");
            c.select_document(pdf("a.pdf")).await.unwrap();
            assert_eq!(c.summarize().await.unwrap(), "summary of alpha beta");
            assert!(c.can_summarize());
            assert_eq!(c.summarize().await.unwrap(), "summary of alpha beta");
            assert_eq!(backend.0.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn missing_extractor_reports_configuration_error() {
        tokio_test::block_on(async {
            let mut c = SummarizationController::new(
                None,
                Arc::new(Echo(AtomicUsize::new(0))),
                &SummarizerConfig::default(),
            );
            let err = c.select_document(pdf("a.pdf")).await.unwrap_err();
            assert!(matches!(err, SummarizerError::ExtractorUnavailable { .. }));
            assert!(!c.is_busy());
            assert!(c.error_message().is_some());
        });
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::Idle.label(), "idle");
        assert_eq!(Status::Busy(BusyKind::Extracting).label(), "extracting");
        assert_eq!(
            Status::Ready {
                summary: "s".into()
            }
            .label(),
            "ready"
        );
    }
}
