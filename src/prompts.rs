//! Fixed texts the assistant sends to the model or shows to the user.
//!
//! Every literal string that shapes a request lives here so wording changes
//! happen in one place and tests can assert against the exact constants.

/// Greeting appended as an assistant message after the first successful upload.
///
/// It is never produced by a model call but is resent with the history like
/// any other message.
pub const UPLOAD_GREETING: &str = "I've processed your file. What would you like to know about it?";

/// Text part that accompanies the image in the injected image block.
pub const IMAGE_INSTRUCTION: &str =
    "This is the uploaded image. Please analyze it when answering questions.";

/// First line of the injected PDF block.
pub const PDF_PREAMBLE: &str = "Here's the content of the uploaded PDF:";

/// Last line of the injected PDF block.
pub const PDF_INSTRUCTION: &str = "Please use this content when answering questions.";

/// Build the user turn that carries extracted PDF text.
///
/// The text is inserted verbatim between the preamble and the instruction,
/// each separated by a blank line.
pub fn pdf_context(text: &str) -> String {
    format!("{PDF_PREAMBLE}\n\n{text}\n\n{PDF_INSTRUCTION}")
}
