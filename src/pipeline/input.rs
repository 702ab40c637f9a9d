//! Upload input: turn a user-supplied path or URL into an [`UploadedFile`].
//!
//! This is the presentation side of the upload contract. It decides the media
//! type and rejects anything that is neither a PDF nor an image, so the
//! extractor only ever sees the two kinds it understands. Downloads are kept
//! in memory; pdfium and the image decoder both read from byte slices.

use crate::content::MediaKind;
use crate::error::DocChatError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw bytes of one upload plus its declared media type.
#[derive(Clone)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("kind", &self.kind)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    /// Wrap already-loaded bytes, rejecting unsupported media types.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, DocChatError> {
        let name = name.into();
        let media_type = media_type.into();
        let kind = MediaKind::from_media_type(&media_type).ok_or_else(|| {
            DocChatError::UnsupportedMediaType {
                name: name.clone(),
                media_type: media_type.clone(),
            }
        })?;

        Ok(Self {
            name,
            media_type,
            kind,
            bytes,
        })
    }

    /// Read a local file; the media type is guessed from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DocChatError> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DocChatError::FileNotFound { path: path.clone() },
            std::io::ErrorKind::PermissionDenied => {
                DocChatError::PermissionDenied { path: path.clone() }
            }
            _ => DocChatError::ReadFailed {
                path: path.clone(),
                source: e,
            },
        })?;

        let media_type = guess_media_type(&path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!("Read {} ({} bytes, {})", path.display(), bytes.len(), media_type);
        Self::new(name, media_type, bytes)
    }

    /// Download a URL into memory.
    ///
    /// The media type comes from `Content-Type`, or from the URL path when the
    /// server sends a generic type.
    pub async fn fetch(url: &str, timeout_secs: u64) -> Result<Self, DocChatError> {
        info!("Downloading upload from: {}", url);

        let parsed = reqwest::Url::parse(url).map_err(|_| DocChatError::InvalidInput {
            input: url.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DocChatError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let response = client.get(parsed.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                DocChatError::DownloadTimeout {
                    url: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                DocChatError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(DocChatError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let name = filename_from_url(&parsed);
        let media_type = match header_type {
            Some(t) if MediaKind::from_media_type(&t).is_some() => t,
            _ => guess_media_type(Path::new(&name)),
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DocChatError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        info!("Downloaded {} ({} bytes, {})", name, bytes.len(), media_type);
        Self::new(name, media_type, bytes.to_vec())
    }

    /// Load from either a URL or a local path.
    pub async fn load(input: &str, download_timeout_secs: u64) -> Result<Self, DocChatError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DocChatError::InvalidInput {
                input: input.to_string(),
            });
        }
        if is_url(input) {
            Self::fetch(input, download_timeout_secs).await
        } else {
            Self::from_path(PathBuf::from(input)).await
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn guess_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn filename_from_url(url: &reqwest::Url) -> String {
    if let Some(mut segments) = url.path_segments() {
        if let Some(last) = segments.next_back() {
            if !last.is_empty() {
                return last.to_string();
            }
        }
    }
    "download".to_string()
}
