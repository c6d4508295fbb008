//! Document intake: turn a user-supplied path or URL into a [`DocumentHandle`].
//!
//! A handle carries the display name, the raw bytes and the *declared* media
//! type. Intake never rejects a document for being the wrong type; that
//! decision belongs to the controller, which only accepts handles whose
//! declared type is PDF.
//!
//! Local files are declared `application/pdf` when the extension is `.pdf` or
//! the content starts with the `%PDF` magic. Downloads use the `Content-Type`
//! header and fall back to the same rules.

use crate::error::SummarizerError;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Media type of a PDF document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type declared when nothing more specific is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A user-selected document: name, declared media type and raw bytes.
///
/// Bytes are shared (`Arc<[u8]>`) so extraction can run on a blocking thread
/// without copying the payload.
#[derive(Clone)]
pub struct DocumentHandle {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl DocumentHandle {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the declared media type is `application/pdf`.
    ///
    /// Comparison ignores ASCII case and any `;` parameters.
    pub fn is_pdf(&self) -> bool {
        is_pdf_media_type(&self.media_type)
    }
}

impl std::fmt::Debug for DocumentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentHandle")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// The `type/subtype` part of a media type, without parameters.
fn media_type_essence(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or_default().trim()
}

/// True when `media_type` denotes PDF.
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type_essence(media_type).eq_ignore_ascii_case(PDF_MEDIA_TYPE)
}

/// True when `media_type` says nothing about the content (generic binary).
fn is_unspecific_media_type(media_type: &str) -> bool {
    let essence = media_type_essence(media_type);
    essence.is_empty()
        || essence.eq_ignore_ascii_case(OCTET_STREAM)
        || essence.eq_ignore_ascii_case("binary/octet-stream")
}

/// Media type for a download: the server's `Content-Type` unless it is
/// missing or generic, in which case the name and content decide.
fn download_media_type(content_type: Option<&str>, name: &str, bytes: &[u8]) -> String {
    match content_type {
        Some(ct) if !is_unspecific_media_type(ct) => ct.trim().to_string(),
        _ => declared_media_type(name, bytes).to_string(),
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Infer the declared media type for a document from its name and content.
pub fn declared_media_type(name: &str, bytes: &[u8]) -> &'static str {
    let has_pdf_extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if has_pdf_extension || bytes.starts_with(b"%PDF") {
        PDF_MEDIA_TYPE
    } else {
        OCTET_STREAM
    }
}

/// Resolve a local path or HTTP/HTTPS URL into a [`DocumentHandle`].
pub async fn load_document(input: &str, timeout_secs: u64) -> Result<DocumentHandle, SummarizerError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file into a handle.
async fn read_local(path: &Path) -> Result<DocumentHandle, SummarizerError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => SummarizerError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => SummarizerError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SummarizerError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = declared_media_type(&name, &bytes);

    debug!(
        "Read local document {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        media_type
    );
    Ok(DocumentHandle::new(name, media_type, bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<DocumentHandle, SummarizerError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| SummarizerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            SummarizerError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            SummarizerError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(SummarizerError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let name = filename_from_url(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SummarizerError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let media_type = download_media_type(content_type.as_deref(), &name, &bytes);

    info!("Downloaded {} ({} bytes, {})", name, bytes.len(), media_type);
    Ok(DocumentHandle::new(name, media_type, bytes.to_vec()))
}

/// Extract a reasonable display name from the URL path.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
