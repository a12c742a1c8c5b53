//! In-crate fakes shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::plugins::history::{
    Conversation, ConversationSummary, HistoryError, LocalStorage, Message, Role,
};
use crate::services::ai::{AttemptError, HttpRequest, HttpResponse, Transport};
use crate::services::conversation::UiShell;
use crate::services::render::RenderSurface;

#[derive(Clone)]
pub(crate) enum Step {
    Respond(HttpResponse),
    Fail(AttemptError),
    /// Never resolves; only a timeout ends the attempt.
    Hang,
    /// Resolves with the response once the gate is notified.
    Gate(Arc<Notify>, HttpResponse),
}

impl Step {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    pub(crate) fn network(message: &str) -> Self {
        Self::Fail(AttemptError::network(message))
    }
}

#[derive(Default)]
struct ScriptState {
    steps: VecDeque<Step>,
    repeat: Option<Step>,
    requests: Vec<HttpRequest>,
}

/// Transport that plays back a fixed script and records every attempt.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                steps: steps.into(),
                ..ScriptState::default()
            })),
        }
    }

    pub(crate) fn repeating(step: Step) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                repeat: Some(step),
                ..ScriptState::default()
            })),
        }
    }

    pub(crate) fn attempts(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub(crate) fn last_request(&self) -> Option<HttpRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }
}

impl Transport for ScriptedTransport {
    async fn post(&self, request: &HttpRequest) -> Result<HttpResponse, AttemptError> {
        let step = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            let next = state.steps.pop_front().or_else(|| state.repeat.clone());
            next.unwrap_or_else(|| Step::network("script exhausted"))
        };
        match step {
            Step::Respond(response) => Ok(response),
            Step::Fail(err) => Err(err),
            Step::Hang => std::future::pending().await,
            Step::Gate(gate, response) => {
                gate.notified().await;
                Ok(response)
            }
        }
    }
}

/// Storage whose every operation fails.
#[derive(Clone, Default)]
pub(crate) struct FailingStorage;

impl LocalStorage for FailingStorage {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, HistoryError> {
        Err(HistoryError::storage("storage unavailable"))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<(), HistoryError> {
        Err(HistoryError::persistence("quota exceeded"))
    }

    async fn remove_item(&self, _key: &str) -> Result<(), HistoryError> {
        Err(HistoryError::persistence("storage unavailable"))
    }
}

#[derive(Default)]
struct SurfaceLog {
    content: String,
    appends: usize,
    scrolls: usize,
}

#[derive(Clone)]
pub(crate) struct RecordingSurface {
    target: String,
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub(crate) fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            log: Arc::new(Mutex::new(SurfaceLog::default())),
        }
    }

    pub(crate) fn content(&self) -> String {
        self.log.lock().unwrap().content.clone()
    }

    pub(crate) fn appends(&self) -> usize {
        self.log.lock().unwrap().appends
    }

    pub(crate) fn scrolls(&self) -> usize {
        self.log.lock().unwrap().scrolls
    }
}

impl RenderSurface for RecordingSurface {
    fn target_id(&self) -> String {
        self.target.clone()
    }

    fn clear(&self) {
        self.log.lock().unwrap().content.clear();
    }

    fn append_markup(&self, markup: &str) {
        let mut log = self.log.lock().unwrap();
        log.content.push_str(markup);
        log.appends += 1;
    }

    fn scroll_to_bottom(&self) {
        self.log.lock().unwrap().scrolls += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ShellEvent {
    Appended { role: Role, text: String },
    Opened(String),
    HistoryChanged(Vec<ConversationSummary>),
    Pending(String),
    PendingCleared(String),
    SendError(String),
    PersistenceFailed,
}

#[derive(Default)]
struct ShellLog {
    events: Vec<ShellEvent>,
    surfaces: Vec<(Message, RecordingSurface)>,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingShell {
    log: Arc<Mutex<ShellLog>>,
}

impl RecordingShell {
    pub(crate) fn events(&self) -> Vec<ShellEvent> {
        self.log.lock().unwrap().events.clone()
    }

    /// Surface handed out for the most recent message with `text`.
    pub(crate) fn surface_for(&self, text: &str) -> Option<RecordingSurface> {
        self.log
            .lock()
            .unwrap()
            .surfaces
            .iter()
            .rev()
            .find(|(m, _)| m.text() == text)
            .map(|(_, s)| s.clone())
    }

    /// Summaries from the latest `history_changed` call.
    pub(crate) fn last_summaries(&self) -> Option<Vec<ConversationSummary>> {
        self.events().into_iter().rev().find_map(|event| match event {
            ShellEvent::HistoryChanged(summaries) => Some(summaries),
            _ => None,
        })
    }

    pub(crate) fn surface_count(&self) -> usize {
        self.log.lock().unwrap().surfaces.len()
    }

    fn push(&self, event: ShellEvent) {
        self.log.lock().unwrap().events.push(event);
    }
}

impl UiShell for RecordingShell {
    type Surface = RecordingSurface;

    fn message_surface(&self, conversation_id: &str, message: &Message) -> RecordingSurface {
        let mut log = self.log.lock().unwrap();
        let target = format!("{}#{}", conversation_id, log.surfaces.len());
        let surface = RecordingSurface::new(&target);
        log.surfaces.push((message.clone(), surface.clone()));
        surface
    }

    fn message_appended(&self, _conversation_id: &str, message: &Message) {
        self.push(ShellEvent::Appended {
            role: message.role(),
            text: message.text().to_string(),
        });
    }

    fn conversation_opened(&self, conversation: &Conversation) {
        self.push(ShellEvent::Opened(conversation.id().to_string()));
    }

    fn history_changed(&self, summaries: &[ConversationSummary]) {
        self.push(ShellEvent::HistoryChanged(summaries.to_vec()));
    }

    fn show_pending(&self, conversation_id: &str) {
        self.push(ShellEvent::Pending(conversation_id.to_string()));
    }

    fn clear_pending(&self, conversation_id: &str) {
        self.push(ShellEvent::PendingCleared(conversation_id.to_string()));
    }

    fn send_error(&self, description: &str) {
        self.push(ShellEvent::SendError(description.to_string()));
    }

    fn persistence_failed(&self, _error: &HistoryError) {
        self.push(ShellEvent::PersistenceFailed);
    }
}
