//! Upload pipeline: from user input to normalised document content.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pdf | encode ──▶ ExtractedContent
//! (path/URL)  (pdfium)  (RGB PNG)
//! ```
//!
//! 1. [`input`]: read a local file or download a URL, classify its media
//!    type and reject anything that is not a PDF or an image
//! 2. [`pdf`]: extract page text through pdfium
//! 3. [`encode`]: decode an image and re-encode it as an RGB PNG
//!
//! Both extraction paths are CPU-bound and run in `spawn_blocking` when
//! called through [`extract`].

pub mod encode;
pub mod input;
pub mod pdf;

use crate::content::{ExtractedContent, MediaKind};
use crate::error::ExtractionError;
use input::UploadedFile;
use tracing::info;

/// Extract an upload on the blocking thread pool.
pub async fn extract(
    file: &UploadedFile,
    password: Option<&str>,
) -> Result<ExtractedContent, ExtractionError> {
    let kind = file.kind;
    let bytes = file.bytes.clone();
    let password = password.map(str::to_string);

    tokio::task::spawn_blocking(move || extract_bytes(kind, &bytes, password.as_deref()))
        .await
        .map_err(|e| ExtractionError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of [`extract`].
pub fn extract_blocking(
    file: &UploadedFile,
    password: Option<&str>,
) -> Result<ExtractedContent, ExtractionError> {
    extract_bytes(file.kind, &file.bytes, password)
}

fn extract_bytes(
    kind: MediaKind,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<ExtractedContent, ExtractionError> {
    let content = match kind {
        MediaKind::Pdf => ExtractedContent::Text(pdf::extract_pdf_text(bytes, password)?),
        MediaKind::Image => ExtractedContent::Image(encode::canonicalize_image(bytes)?),
    };
    info!("Extracted {} content: {} bytes", kind, content.len());
    Ok(content)
}
