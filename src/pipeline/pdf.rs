//! PDF text extraction via pdfium.
//!
//! pdfium is bound through `pdfium-auto`, which downloads and caches the
//! shared library on the first PDF upload. The library is not async-safe, so
//! callers in async code go through [`crate::pipeline::extract`], which runs
//! this module inside `spawn_blocking`.

use crate::error::ExtractionError;
use tracing::{debug, info};

/// Extract the text of every page, in document order.
///
/// Each page contributes its text followed by `\n`. Pages without text still
/// contribute the newline, so page boundaries survive in the output.
pub fn extract_pdf_text(bytes: &[u8], password: Option<&str>) -> Result<String, ExtractionError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(ExtractionError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        });
    }

    let pdfium = pdfium_auto::bind_pdfium_silent()
        .map_err(|e| ExtractionError::PdfiumUnavailable(e.to_string()))?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| classify_load_error(format!("{:?}", e), password.is_some()))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ExtractionError::PageTextFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        debug!("Page {} → {} chars", idx + 1, text.len());
        texts.push(text);
    }

    Ok(join_pages(texts))
}

/// Concatenate page texts with a trailing newline after each page.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for page in pages {
        out.push_str(page.as_ref());
        out.push('\n');
    }
    out
}

fn classify_load_error(detail: String, had_password: bool) -> ExtractionError {
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            ExtractionError::WrongPassword
        } else {
            ExtractionError::PasswordRequired
        }
    } else {
        ExtractionError::CorruptPdf { detail }
    }
}
