//! Context assembly: history + document content → request blocks.
//!
//! The document is injected as the first block of **every** request. No
//! state records whether it was already sent, so there is nothing to get out
//! of sync; the cost is that each turn resends the whole document and the
//! whole history. There is no truncation and no token budgeting.
//!
//! ## Block Layout
//!
//! ```text
//! [0]   user: document block        (only when content is present)
//! [1..] history, in order           (assistant → assistant, else user)
//! ```

use crate::content::{ExtractedContent, PngImage};
use crate::message::{Message, Role};
use crate::prompts::{pdf_context, IMAGE_INSTRUCTION};
use std::borrow::Cow;
use tracing::debug;

/// Payload of one request block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockContent<'a> {
    /// A plain text turn.
    Text(Cow<'a, str>),
    /// The uploaded image plus the instruction that accompanies it.
    ImageWithText {
        image: Cow<'a, PngImage>,
        text: Cow<'a, str>,
    },
}

/// One unit of the payload sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBlock<'a> {
    pub role: Role,
    pub content: BlockContent<'a>,
}

impl<'a> RequestBlock<'a> {
    pub fn text(role: Role, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            role,
            content: BlockContent::Text(text.into()),
        }
    }

    pub fn image(image: &'a PngImage, text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            role: Role::User,
            content: BlockContent::ImageWithText {
                image: Cow::Borrowed(image),
                text: text.into(),
            },
        }
    }

    /// The text carried by this block (the instruction, for image blocks).
    pub fn text_content(&self) -> &str {
        match &self.content {
            BlockContent::Text(text) => text,
            BlockContent::ImageWithText { text, .. } => text,
        }
    }

    /// Detach from the borrowed history.
    pub fn into_owned(self) -> RequestBlock<'static> {
        let content = match self.content {
            BlockContent::Text(text) => BlockContent::Text(Cow::Owned(text.into_owned())),
            BlockContent::ImageWithText { image, text } => BlockContent::ImageWithText {
                image: Cow::Owned(image.into_owned()),
                text: Cow::Owned(text.into_owned()),
            },
        };
        RequestBlock {
            role: self.role,
            content,
        }
    }
}

/// Build the ordered request for one model call.
pub fn build_request<'a>(
    history: &'a [Message],
    file_content: Option<&'a ExtractedContent>,
) -> Vec<RequestBlock<'a>> {
    let mut blocks = Vec::with_capacity(history.len() + 1);

    if let Some(content) = file_content {
        blocks.push(document_block(content));
    }

    // Labels were already folded into `Role` by `Role::from_label`.
    blocks.extend(
        history
            .iter()
            .map(|msg| RequestBlock::text(msg.role, msg.content.as_str())),
    );

    debug!(
        "Assembled {} blocks ({} history, document: {})",
        blocks.len(),
        history.len(),
        file_content.is_some()
    );
    blocks
}

fn document_block(content: &ExtractedContent) -> RequestBlock<'_> {
    match content {
        ExtractedContent::Image(png) => RequestBlock::image(png, IMAGE_INSTRUCTION),
        ExtractedContent::Text(text) => RequestBlock::text(Role::User, pdf_context(text)),
    }
}
