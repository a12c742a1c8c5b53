//! Core of the Wayne chat client.
//!
//! The UI shell drives a [`ConversationController`], which appends messages,
//! persists them through a [`HistoryStore`], posts them with a
//! [`RequestClient`] and renders replies with a [`RenderAnimator`]. The shell
//! stays behind the [`UiShell`] and [`RenderSurface`] traits; storage and
//! network stay behind [`LocalStorage`] and [`Transport`].

pub mod plugins;
pub mod services;

#[cfg(test)]
mod test_support;

pub use plugins::history::{
    Conversation, ConversationSet, ConversationSummary, HistoryError, HistoryStore, LibsqlStorage,
    LocalStorage, MemoryStorage, Message, Role,
};
pub use services::ai::{ChatTransport, Mode, ReplyPayload, RequestClient, RequestError, Transport};
pub use services::config::{load_request_config, RequestConfig};
pub use services::conversation::{ConversationController, SendOutcome, SendState, UiShell};
pub use services::image::{ImageAttachment, ImageError};
pub use services::render::{RenderAnimator, RenderOutcome, RenderSurface};
pub use services::response::{classify, escape_markup, ParsedReply};
