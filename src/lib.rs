//! # docchat
//!
//! Chat with one uploaded document (a PDF or an image) using a remote LLM.
//!
//! The document is normalised once at upload time (PDF → page text, image →
//! RGB PNG) and then injected as the first block of every model call, ahead
//! of the full chat history. Session state lives in memory for the lifetime
//! of one [`SessionLoop`].
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload                          submit
//!  │                               │
//!  ├─ 1. Input    path / URL       ├─ 4. Assemble  document block + history
//!  ├─ 2. Extract  pdfium / image   ├─ 5. Model     one completion per turn
//!  └─ 3. Store    last upload wins └─ 6. Append    reply (or leave unanswered)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docchat::{ChatConfig, LlmClient, SessionLoop, UploadedFile};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from ANTHROPIC_API_KEY / OPENAI_API_KEY / …
//!     let config = ChatConfig::default();
//!     let client = LlmClient::from_config(&config)?;
//!     let mut session = SessionLoop::new(Arc::new(client), &config);
//!
//!     session.on_upload(UploadedFile::from_path("report.pdf").await?).await?;
//!     let reply = session.on_user_turn("Summarize this").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docchat` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod content;
pub mod error;
pub mod message;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assemble::{build_request, BlockContent, RequestBlock};
pub use config::{ChatConfig, ChatConfigBuilder};
pub use content::{ExtractedContent, MediaKind, PngImage};
pub use error::{DocChatError, ExtractionError, ModelCallError};
pub use message::{Message, Role};
pub use model::{CompletionParams, LlmClient, ModelClient};
pub use pipeline::input::UploadedFile;
pub use pipeline::{extract, extract_blocking};
pub use session::{Session, SessionLoop};
pub use view::{ChatView, NoopView, SharedView};
