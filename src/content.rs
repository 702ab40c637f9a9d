//! Normalised document content shared by the extractor and the assembler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of upload the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Pdf,
    Image,
}

impl MediaKind {
    /// Classify a declared media type.
    ///
    /// `application/pdf` is a PDF, anything starting with `image` is an image,
    /// everything else is `None` and must be rejected before it reaches the
    /// session.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        if media_type == "application/pdf" {
            Some(MediaKind::Pdf)
        } else if media_type.starts_with("image") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Pdf => f.write_str("PDF"),
            MediaKind::Image => f.write_str("Image"),
        }
    }
}

/// An in-memory PNG holding RGB8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PngImage {
    /// Media type of every canonical image payload.
    pub const MEDIA_TYPE: &'static str = "image/png";
}

/// The session's document context.
///
/// A new upload replaces the previous value entirely; the two are never
/// merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedContent {
    /// Text extracted from a PDF, one trailing newline per page.
    Text(String),
    /// An uploaded image re-encoded as RGB PNG.
    Image(PngImage),
}

impl ExtractedContent {
    pub fn kind(&self) -> MediaKind {
        match self {
            ExtractedContent::Text(_) => MediaKind::Pdf,
            ExtractedContent::Image(_) => MediaKind::Image,
        }
    }

    /// Size of the payload in bytes (text length or PNG size).
    pub fn len(&self) -> usize {
        match self {
            ExtractedContent::Text(text) => text.len(),
            ExtractedContent::Image(png) => png.bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
