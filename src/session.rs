//! Session state and the turn loop that drives it.
//!
//! [`Session`] is the plain state: history plus the current document.
//! [`SessionLoop`] owns one `Session` and reacts to the two user events,
//! upload and submit. Both handlers take `&mut self`, so a session can never
//! have two model calls in flight; the owner (a terminal loop, a connection
//! task) serialises events simply by holding the loop.
//!
//! ## Turn Cycle
//!
//! ```text
//! submit ─▶ append user msg ─▶ render ─▶ build_request ─▶ model call
//!                                                            │
//!                         ┌──────────── ok ──────────────────┤
//!                         ▼                                  ▼ err
//!                append assistant msg ─▶ render        render error
//!                                                     (message stays
//!                                                      unanswered)
//! ```

use crate::assemble::build_request;
use crate::config::ChatConfig;
use crate::content::ExtractedContent;
use crate::error::{ExtractionError, ModelCallError};
use crate::message::Message;
use crate::model::{CompletionParams, ModelClient};
use crate::pipeline::{self, input::UploadedFile};
use crate::prompts::UPLOAD_GREETING;
use crate::view::{NoopView, SharedView};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One user's conversation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    messages: Vec<Message>,
    file_content: Option<ExtractedContent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// History in chronological (and display) order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn file_content(&self) -> Option<&ExtractedContent> {
        self.file_content.as_ref()
    }

    /// Replace the document; the previous one is dropped, never merged.
    pub fn set_file_content(&mut self, content: ExtractedContent) {
        self.file_content = Some(content);
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Drives one [`Session`] through uploads and chat turns.
pub struct SessionLoop {
    session: Session,
    client: Arc<dyn ModelClient>,
    view: SharedView,
    params: CompletionParams,
    pdf_password: Option<String>,
}

impl SessionLoop {
    /// Start an empty session.
    pub fn new(client: Arc<dyn ModelClient>, config: &ChatConfig) -> Self {
        Self {
            session: Session::new(),
            client,
            view: Arc::new(NoopView),
            params: CompletionParams::from(config),
            pdf_password: config.pdf_password.clone(),
        }
    }

    /// Attach the view that renders this session.
    pub fn with_view(mut self, view: SharedView) -> Self {
        self.view = view;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn file_content(&self) -> Option<&ExtractedContent> {
        self.session.file_content()
    }

    /// Handle an upload event.
    ///
    /// On failure the error is shown to the view and returned; the session
    /// is not modified.
    pub async fn on_upload(&mut self, file: UploadedFile) -> Result<(), ExtractionError> {
        info!("Upload: {} ({}, {} bytes)", file.name, file.media_type, file.bytes.len());
        self.view.on_upload_start(&file.name, file.kind);

        match pipeline::extract(&file, self.pdf_password.as_deref()).await {
            Ok(content) => {
                self.on_content(content);
                Ok(())
            }
            Err(e) => {
                warn!("Extraction of '{}' failed: {}", file.name, e);
                self.view.on_error(&format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Install freshly extracted content as the session's document.
    ///
    /// The greeting is added only when history is still empty, i.e. on the
    /// first upload of a fresh session.
    pub fn on_content(&mut self, content: ExtractedContent) {
        let kind = content.kind();
        self.session.set_file_content(content);

        if self.session.messages.is_empty() {
            let greeting = Message::assistant(UPLOAD_GREETING);
            self.view.on_message(&greeting);
            self.session.push(greeting);
        }

        self.view.on_upload_complete(kind);
    }

    /// Handle a submitted chat message.
    ///
    /// Returns the assistant's reply. On failure the user message stays in
    /// history without an answer and will be resent with the next turn.
    pub async fn on_user_turn(&mut self, text: impl Into<String>) -> Result<String, ModelCallError> {
        let user = Message::user(text);
        self.view.on_message(&user);
        self.session.push(user);

        let blocks = build_request(self.session.messages(), self.session.file_content());
        debug!("Turn {}: sending {} blocks", self.session.messages.len(), blocks.len());

        self.view.on_thinking_start();
        let result = self.client.complete(&blocks, &self.params).await;
        self.view.on_thinking_end();

        match result {
            Ok(reply) => {
                info!("Assistant replied ({} chars)", reply.len());
                let assistant = Message::assistant(reply.clone());
                self.view.on_message(&assistant);
                self.session.push(assistant);
                Ok(reply)
            }
            Err(e) => {
                warn!("Model call failed: {}", e);
                self.view.on_error(&format!("Error: {e}"));
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for SessionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLoop")
            .field("messages", &self.session.messages.len())
            .field("file_content", &self.session.file_content.as_ref().map(|c| c.kind()))
            .field("params", &self.params)
            .finish()
    }
}
