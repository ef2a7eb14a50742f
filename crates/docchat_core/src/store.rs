use docchat_logging::chat_debug;

use crate::message::{ChatMessage, HistoryEntry, MessageId, MessageStatus};

/// Ordered chat messages plus the backend conversation history.
///
/// Messages are only ever appended; an agent placeholder is replaced in place
/// and is addressed by its [`MessageId`], never by index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
    history: Vec<HistoryEntry>,
    next_id: MessageId,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the question and a pending agent placeholder; returns the placeholder id.
    pub fn append_user_and_placeholder(&mut self, question: &str) -> MessageId {
        debug_assert!(
            self.pending_placeholder().is_none(),
            "a placeholder is already pending"
        );
        let user_id = self.allocate_id();
        self.messages.push(ChatMessage::user(user_id, question));
        let placeholder_id = self.allocate_id();
        self.messages.push(ChatMessage::placeholder(placeholder_id));
        placeholder_id
    }

    /// Replaces the placeholder with a final answer. No-op unless `id` is still a placeholder.
    pub fn resolve_placeholder(
        &mut self,
        id: MessageId,
        answer: &str,
        translation: Option<String>,
    ) -> bool {
        let Some(message) = self.placeholder_mut(id) else {
            chat_debug!("resolve ignored: message {} is not a placeholder", id);
            return false;
        };
        message.text = answer.to_string();
        message.status = MessageStatus::Final;
        message.translation = translation;
        true
    }

    /// Moves the placeholder to the terminal `Failed` state with an explanatory text.
    pub fn fail_placeholder(&mut self, id: MessageId, text: &str) -> bool {
        let Some(message) = self.placeholder_mut(id) else {
            chat_debug!("fail ignored: message {} is not a placeholder", id);
            return false;
        };
        message.text = text.to_string();
        message.status = MessageStatus::Failed;
        true
    }

    /// First write wins; only final messages accept a translation.
    pub fn attach_translation(&mut self, id: MessageId, translated: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if message.is_final() && message.translation.is_none() => {
                message.translation = Some(translated.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn set_agent_type(&mut self, id: MessageId, agent_type: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if message.is_final() => {
                message.agent_type = Some(agent_type.to_string());
                true
            }
            _ => false,
        }
    }

    /// Adopts the backend's history verbatim.
    pub fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = entries;
    }

    pub fn pending_placeholder(&self) -> Option<MessageId> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_placeholder())
            .map(|m| m.id)
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn placeholder_mut(&mut self, id: MessageId) -> Option<&mut ChatMessage> {
        self.messages
            .iter_mut()
            .find(|m| m.id == id)
            .filter(|m| m.is_placeholder())
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
