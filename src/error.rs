//! Error types for the docchat library.
//!
//! Three error types follow the three places a session can fail:
//!
//! * [`DocChatError`]: setup and input. The provider is not configured, a
//!   file cannot be read or downloaded, or its media type is not accepted.
//!   These happen before anything reaches the session.
//!
//! * [`ExtractionError`]: an upload was accepted but its bytes could not be
//!   turned into [`crate::content::ExtractedContent`] (corrupt PDF, wrong
//!   password, undecodable image). The session is left untouched.
//!
//! * [`ModelCallError`]: the remote completion failed. The user's message
//!   stays in history, unanswered.
//!
//! None of them is fatal to a session: each is caught by the handler that
//! produced it and turned into a message for the view.

use std::path::PathBuf;
use thiserror::Error;

/// Setup and upload-input errors.
#[derive(Debug, Error)]
pub enum DocChatError {
    // ── Provider / config ─────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upload input ──────────────────────────────────────────────────────
    /// Upload path does not exist.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The declared media type is neither a PDF nor an image.
    #[error("Unsupported file type '{media_type}' for '{name}'\nUpload a PDF or an image (PNG, JPEG).")]
    UnsupportedMediaType { name: String, media_type: String },

    /// The upload argument is not a usable path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// An uploaded file could not be converted into model context.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Declared as a PDF but the bytes do not start with `%PDF`.
    #[error("File is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF")]
    WrongPassword,

    /// pdfium failed on a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on the first PDF upload.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumUnavailable(String),

    /// Image bytes could not be decoded (unsupported or corrupt encoding).
    #[error("Could not decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// Re-encoding the decoded image as PNG failed.
    #[error("Could not encode image as PNG: {0}")]
    ImageEncode(#[source] image::ImageError),

    /// Unexpected internal error (e.g. the blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The remote completion failed.
///
/// There is no retry classification: every variant is shown to the user the
/// same way and retrying is an explicit user action.
#[derive(Debug, Error)]
pub enum ModelCallError {
    /// Transport, auth, rate-limit or malformed-response error from the provider.
    #[error("LLM API error: {message}")]
    Api { message: String },

    /// The call did not return within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The provider answered with no text.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_media_type_display() {
        let e = DocChatError::UnsupportedMediaType {
            name: "notes.txt".into(),
            media_type: "text/plain".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("text/plain"), "got: {msg}");
        assert!(msg.contains("notes.txt"), "got: {msg}");
    }

    #[test]
    fn download_timeout_display() {
        let e = DocChatError::DownloadTimeout {
            url: "https://example.com/a.pdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn not_a_pdf_display() {
        let e = ExtractionError::NotAPdf {
            magic: b"\x89PNG".to_vec(),
        };
        assert!(e.to_string().contains("not a valid PDF"));
    }

    #[test]
    fn page_text_failed_display() {
        let e = ExtractionError::PageTextFailed {
            page: 3,
            detail: "boom".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("boom"));
    }

    #[test]
    fn model_timeout_display() {
        let e = ModelCallError::Timeout { secs: 120 };
        assert!(e.to_string().contains("120s"));
    }

    #[test]
    fn model_api_display() {
        let e = ModelCallError::Api {
            message: "401 invalid x-api-key".into(),
        };
        assert!(e.to_string().contains("invalid x-api-key"));
    }
}
