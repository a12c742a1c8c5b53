use serde::{Deserialize, Serialize};

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    role: Role,
    text: String,
    image: Option<String>,
    created_at_ms: u64,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            role,
            text: text.into(),
            image,
            created_at_ms: super::now_ms(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: String,
    title: String,
    messages: Vec<Message>,
    created_at_ms: u64,
}

impl Conversation {
    pub fn new(title: Option<&str>) -> Self {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string());
        Self {
            id: super::new_id("conv"),
            title,
            messages: Vec::new(),
            created_at_ms: super::now_ms(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// The `limit` most recent messages, oldest first.
    pub fn recent(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Appends a message. Returns `true` when the title was derived from it.
    pub(crate) fn push(&mut self, message: Message) -> bool {
        let retitle = self.messages.is_empty()
            && message.role == Role::User
            && self.title == DEFAULT_CONVERSATION_TITLE
            && !message.text.trim().is_empty();
        if retitle {
            self.title = super::title::title_from_message(&message.text);
        }
        self.messages.push(message);
        retitle
    }
}

/// Light-weight view of a conversation for history lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub created_at_ms: u64,
    pub message_count: u32,
    pub last_message_at_ms: u64,
    pub is_active: bool,
}

/// All persisted conversations, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSet {
    conversations: Vec<Conversation>,
}

impl ConversationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&Conversation> {
        self.conversations.first()
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Inserts at the front. Ids are uuid-based, a duplicate replaces the old entry.
    pub(crate) fn insert(&mut self, conversation: Conversation) {
        self.conversations.retain(|c| c.id != conversation.id);
        self.conversations.insert(0, conversation);
    }

    pub fn summaries(&self, active_id: Option<&str>) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                created_at_ms: c.created_at_ms,
                message_count: c.messages.len().min(u32::MAX as usize) as u32,
                last_message_at_ms: c.messages.last().map(|m| m.created_at_ms).unwrap_or(0),
                is_active: active_id == Some(c.id.as_str()),
            })
            .collect()
    }
}
