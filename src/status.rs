//! Status-change hook for the summarisation controller.
//!
//! Inject an [`Arc<dyn StatusObserver>`] via
//! [`crate::controller::SummarizationController::with_observer`] to be told
//! every time the controller's [`Status`] changes. The CLI uses it to drive
//! its "Extracting text…" / "Summarizing…" spinner; a GUI would repaint.
//!
//! # Example
//!
//! ```rust
//! use pdf_summarizer::{Status, StatusObserver};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountBusy(AtomicUsize);
//!
//! impl StatusObserver for CountBusy {
//!     fn on_status_change(&self, _previous: &Status, current: &Status) {
//!         if current.is_busy() {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//! ```

use crate::controller::Status;
use std::sync::Arc;

/// Receives every status transition of a controller.
///
/// Called synchronously from the controller; keep implementations cheap.
pub trait StatusObserver: Send + Sync {
    /// `previous` and `current` may be equal variants with different payloads
    /// (e.g. one error message replaced by another).
    fn on_status_change(&self, previous: &Status, current: &Status) {
        let _ = (previous, current);
    }
}

/// A no-op observer; the default when none is configured.
pub struct NoopStatusObserver;

impl StatusObserver for NoopStatusObserver {}

/// Convenience alias matching the type stored in the controller.
pub type SharedStatusObserver = Arc<dyn StatusObserver>;
