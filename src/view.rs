//! The presentation-side callback trait.
//!
//! A [`ChatView`] is handed to [`crate::session::SessionLoop`] and receives
//! everything the user should see: messages in history order, the
//! "working…" indicators around slow operations, and error strings. The
//! session never prints anything itself, so a terminal, a web socket or a
//! test recorder can all sit behind the same trait.
//!
//! # Example
//!
//! ```rust
//! use docchat::{ChatView, Message};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Transcript {
//!     lines: Mutex<Vec<String>>,
//! }
//!
//! impl ChatView for Transcript {
//!     fn on_message(&self, message: &Message) {
//!         self.lines
//!             .lock()
//!             .unwrap()
//!             .push(format!("{}: {}", message.role, message.content));
//!     }
//! }
//! ```

use crate::content::MediaKind;
use crate::message::Message;
use std::sync::Arc;

/// Receives display events from a session.
///
/// All methods have default no-op implementations so views only override
/// what they render.
pub trait ChatView: Send + Sync {
    /// A message was appended to history and should be displayed.
    fn on_message(&self, message: &Message) {
        let _ = message;
    }

    /// Extraction of an upload is starting.
    ///
    /// # Arguments
    /// * `name`: file name as given by the user
    /// * `kind`: PDF or image
    fn on_upload_start(&self, name: &str, kind: MediaKind) {
        let _ = (name, kind);
    }

    /// The upload was extracted and is now the session's document.
    fn on_upload_complete(&self, kind: MediaKind) {
        let _ = kind;
    }

    /// A model call is about to be made.
    fn on_thinking_start(&self) {}

    /// The model call returned, successfully or not.
    fn on_thinking_end(&self) {}

    /// Something failed; `error` is ready to show as-is.
    fn on_error(&self, error: &str) {
        let _ = error;
    }
}

/// A view that discards every event.
pub struct NoopView;

impl ChatView for NoopView {}

/// Convenience alias for the type held by a session.
pub type SharedView = Arc<dyn ChatView>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingView {
        messages: AtomicUsize,
        errors: AtomicUsize,
    }

    impl ChatView for CountingView {
        fn on_message(&self, _message: &Message) {
            self.messages.fetch_add(1, Ordering::SeqCst);
        }

        fn on_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_view_does_not_panic() {
        let view = NoopView;
        view.on_message(&Message::user("hi"));
        view.on_upload_start("a.pdf", MediaKind::Pdf);
        view.on_upload_complete(MediaKind::Pdf);
        view.on_thinking_start();
        view.on_thinking_end();
        view.on_error("boom");
    }

    #[test]
    fn overridden_methods_receive_events() {
        let view = CountingView::default();
        view.on_message(&Message::user("a"));
        view.on_message(&Message::assistant("b"));
        view.on_error("x");
        view.on_thinking_start();

        assert_eq!(view.messages.load(Ordering::SeqCst), 2);
        assert_eq!(view.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_view_works() {
        let view: SharedView = Arc::new(NoopView);
        view.on_upload_complete(MediaKind::Image);
    }
}
