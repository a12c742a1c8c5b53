//! Conversation orchestration: one send round-trip at a time per conversation.
//!
//! The controller owns the in-memory conversation set, the active
//! conversation id, and the pending image. The UI shell only sees snapshots
//! and callbacks.

use std::sync::Mutex;

use crate::plugins::history::{
    Conversation, ConversationSet, ConversationSummary, HistoryError, HistoryStore, LocalStorage,
    Message, Role,
};
use crate::services::ai::{ChatRequestBody, InFlightRegistry, Mode, RequestClient, Transport};
use crate::services::config::RequestConfig;
use crate::services::image::ImageAttachment;
use crate::services::render::{RenderAnimator, RenderSurface};
use crate::services::response::classify;

/// Prefix of assistant messages that record a failed request.
pub const WARNING_MARKER: &str = "⚠️";

/// Presentation callbacks. The controller never touches presentation APIs
/// directly.
pub trait UiShell {
    type Surface: RenderSurface;

    /// Display area for one message bubble.
    fn message_surface(&self, conversation_id: &str, message: &Message) -> Self::Surface;

    fn message_appended(&self, conversation_id: &str, message: &Message);

    /// The shell should drop the current transcript; replay follows.
    fn conversation_opened(&self, conversation: &Conversation);

    fn history_changed(&self, summaries: &[ConversationSummary]);

    fn show_pending(&self, conversation_id: &str);

    fn clear_pending(&self, conversation_id: &str);

    fn send_error(&self, description: &str);

    fn persistence_failed(&self, _error: &HistoryError) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send: empty text and no image.
    Ignored,
    /// A send is already in flight for the active conversation.
    Busy,
    Replied(Message),
    /// The request failed; the message holds the recorded error text.
    Failed(Message),
    /// The conversation was cleared while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
}

#[derive(Default)]
struct ControllerState {
    conversations: ConversationSet,
    active_id: Option<String>,
    pending_image: Option<ImageAttachment>,
    mode: Mode,
}

pub struct ConversationController<S, T, U> {
    history: HistoryStore<S>,
    client: RequestClient<T>,
    shell: U,
    animator: RenderAnimator,
    in_flight: InFlightRegistry,
    history_window: usize,
    state: Mutex<ControllerState>,
}

impl<S, T, U> ConversationController<S, T, U>
where
    S: LocalStorage,
    T: Transport,
    U: UiShell,
{
    pub fn new(config: &RequestConfig, history: HistoryStore<S>, transport: T, shell: U) -> Self {
        Self {
            history,
            client: RequestClient::new(config, transport),
            shell,
            animator: RenderAnimator::default(),
            in_flight: InFlightRegistry::new(),
            history_window: config.history_window.max(1),
            state: Mutex::new(ControllerState {
                mode: config.mode,
                ..ControllerState::default()
            }),
        }
    }

    pub fn with_animator(mut self, animator: RenderAnimator) -> Self {
        self.animator = animator;
        self
    }

    pub fn shell(&self) -> &U {
        &self.shell
    }

    /// Load persisted history and open the most recent conversation, or
    /// start a fresh one when there is none.
    pub async fn bootstrap(&self) {
        let loaded = self.history.load().await;
        log::info!("Loaded {} conversations", loaded.len());
        let first_id = loaded.first().map(|c| c.id().to_string());
        self.with_state(|state| {
            state.conversations = loaded;
            state.active_id = None;
        });

        match first_id {
            Some(id) => {
                self.open_conversation(&id).await;
            }
            None => {
                self.new_conversation(None).await;
            }
        }
    }

    pub fn conversations(&self) -> ConversationSet {
        self.with_state(|state| state.conversations.clone())
            .unwrap_or_default()
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.with_state(|state| state.conversations.get(id).cloned())
            .flatten()
    }

    pub fn active_conversation_id(&self) -> Option<String> {
        self.with_state(|state| state.active_id.clone()).flatten()
    }

    pub fn send_state(&self, conversation_id: &str) -> SendState {
        if self.in_flight.is_busy(conversation_id) {
            SendState::Sending
        } else {
            SendState::Idle
        }
    }

    pub fn mode(&self) -> Mode {
        self.with_state(|state| state.mode).unwrap_or_default()
    }

    pub fn set_mode(&self, mode: Mode) {
        self.with_state(|state| state.mode = mode);
    }

    /// Hold `image` for the next send, replacing any earlier one.
    pub fn attach_image(&self, image: ImageAttachment) {
        self.with_state(|state| state.pending_image = Some(image));
    }

    pub fn detach_image(&self) -> Option<ImageAttachment> {
        self.with_state(|state| state.pending_image.take()).flatten()
    }

    pub fn pending_image(&self) -> Option<ImageAttachment> {
        self.with_state(|state| state.pending_image.clone())
            .flatten()
    }

    /// Create a conversation, make it active and persist. Returns its id.
    pub async fn new_conversation(&self, title: Option<&str>) -> String {
        let conversation = Conversation::new(title);
        let id = conversation.id().to_string();
        let snapshot = self.with_state(|state| {
            state.conversations.insert(conversation.clone());
            state.active_id = Some(id.clone());
            state.conversations.clone()
        });

        if let Some(snapshot) = snapshot {
            self.persist(&snapshot).await;
        }
        self.shell.conversation_opened(&conversation);
        self.notify_history_changed();
        id
    }

    /// Make `id` active and replay its transcript without animation.
    pub async fn open_conversation(&self, id: &str) -> bool {
        let conversation = self
            .with_state(|state| {
                let conversation = state.conversations.get(id).cloned()?;
                state.active_id = Some(id.to_string());
                Some(conversation)
            })
            .flatten();
        let Some(conversation) = conversation else {
            log::warn!("Cannot open unknown conversation {}", id);
            return false;
        };

        self.shell.conversation_opened(&conversation);
        self.notify_history_changed();
        for message in conversation.messages() {
            let surface = self.shell.message_surface(id, message);
            self.animator
                .show(&surface, &classify(message.text()), false)
                .await;
        }
        true
    }

    /// Wipe stored history and start over with a single empty conversation.
    pub async fn clear_history(&self) -> String {
        self.history.clear().await;
        self.with_state(|state| {
            state.conversations = ConversationSet::new();
            state.active_id = None;
            state.pending_image = None;
        });
        log::info!("Conversation history cleared");
        self.new_conversation(None).await
    }

    /// Send `text` (and `image`, or the pending image) on the active
    /// conversation and record the reply or the failure.
    pub async fn send_message(&self, text: &str, image: Option<ImageAttachment>) -> SendOutcome {
        let text = text.trim();
        let has_pending = self
            .with_state(|state| state.pending_image.is_some())
            .unwrap_or(false);
        if text.is_empty() && image.is_none() && !has_pending {
            log::debug!("Ignoring empty send");
            return SendOutcome::Ignored;
        }

        let conversation_id = match self.active_conversation_id() {
            Some(id) => id,
            None => self.new_conversation(None).await,
        };

        let Some(_guard) = self.in_flight.try_acquire(&conversation_id) else {
            log::warn!("Conversation {} is busy, send rejected", conversation_id);
            return SendOutcome::Busy;
        };

        let image = image
            .or_else(|| self.detach_image())
            .map(ImageAttachment::into_data_url);
        if text.is_empty() && image.is_none() {
            log::debug!("Ignoring empty send");
            return SendOutcome::Ignored;
        }

        let user_message = Message::new(Role::User, text, image.clone());
        if !self
            .append_message(&conversation_id, user_message, false)
            .await
        {
            return SendOutcome::Discarded;
        }
        self.shell.show_pending(&conversation_id);

        let (history, mode) = self
            .with_state(|state| {
                let history = state
                    .conversations
                    .get(&conversation_id)
                    .map(|c| c.recent(self.history_window).to_vec())
                    .unwrap_or_default();
                (history, state.mode)
            })
            .unwrap_or_default();
        let body = ChatRequestBody::new(text, image, &history, mode);

        let result = self.client.send(&body).await;
        self.shell.clear_pending(&conversation_id);

        // Error text animates like any other assistant reply.
        let (message, failed) = match result {
            Ok(reply) => (Message::new(Role::Assistant, reply.text, reply.image), false),
            Err(err) => {
                log::warn!("Send on conversation {} failed: {}", conversation_id, err);
                let description = format!("{} Error: {}", WARNING_MARKER, err);
                self.shell.send_error(&description);
                (Message::new(Role::Assistant, description, None), true)
            }
        };

        if !self
            .append_message(&conversation_id, message.clone(), true)
            .await
        {
            return SendOutcome::Discarded;
        }
        if failed {
            SendOutcome::Failed(message)
        } else {
            SendOutcome::Replied(message)
        }
    }

    /// Append, persist, notify, then render. Returns false when the
    /// conversation no longer exists.
    async fn append_message(&self, conversation_id: &str, message: Message, animate: bool) -> bool {
        let appended = self
            .with_state(|state| {
                let conversation = state.conversations.get_mut(conversation_id)?;
                conversation.push(message.clone());
                Some(state.conversations.clone())
            })
            .flatten();
        let Some(snapshot) = appended else {
            log::warn!(
                "Conversation {} no longer exists, dropping {} message",
                conversation_id,
                message.role().as_str()
            );
            return false;
        };

        self.persist(&snapshot).await;
        self.shell.message_appended(conversation_id, &message);
        // Counts and timestamps in the summaries move with every append.
        self.notify_history_changed();

        let surface = self.shell.message_surface(conversation_id, &message);
        self.animator
            .show(&surface, &classify(message.text()), animate)
            .await;
        true
    }

    async fn persist(&self, snapshot: &ConversationSet) {
        if let Err(err) = self.history.save(snapshot).await {
            self.shell.persistence_failed(&err);
        }
    }

    fn notify_history_changed(&self) {
        let summaries = self
            .with_state(|state| state.conversations.summaries(state.active_id.as_deref()))
            .unwrap_or_default();
        self.shell.history_changed(&summaries);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ControllerState) -> R) -> Option<R> {
        match self.state.lock() {
            Ok(mut state) => Some(f(&mut state)),
            Err(err) => {
                log::error!("Conversation state lock poisoned: {}", err);
                None
            }
        }
    }
}
