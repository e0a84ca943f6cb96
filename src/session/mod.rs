//! Editors: the working object of each workspace and its save lifecycle.
//!
//! Every editor owns one draft. It is `Empty` until something is created or
//! opened, `Dirty` after any change, and `Clean` after a successful save. A
//! save either updates the record the draft is bound to or creates a record
//! and binds to it. Editors take `&mut self` for requests, so at most one is
//! outstanding per editor.

pub mod canvas;
pub mod chat;
pub mod draft;
pub mod image;
pub mod notice;
pub mod presentation;
pub mod video;
pub mod workspace;

#[cfg(test)]
pub(crate) mod test_support;

pub use canvas::{AnnotationLayer, Compositor, DataUrlCompositor, Point, Stroke, Tool};
pub use chat::ChatSession;
pub use draft::{DraftState, DraftStatus};
pub use image::ImageSession;
pub use notice::{Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use presentation::{DeckSource, PresentationSession};
pub use video::{CurrentVideo, VideoSession};
pub use workspace::Workspace;
