use serde::{Deserialize, Serialize};

/// Stable identity of a chat message; assigned in insertion order.
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    /// Answer text is settled.
    Final,
    /// Agent answer still being computed.
    Pending,
    /// The query behind this agent message failed; terminal.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub status: MessageStatus,
    /// Set once by a successful translation, never cleared.
    pub translation: Option<String>,
    /// Backend classification of the agent that produced an answer.
    pub agent_type: Option<String>,
}

impl ChatMessage {
    pub(crate) fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            sender: Sender::User,
            status: MessageStatus::Final,
            translation: None,
            agent_type: None,
        }
    }

    pub(crate) fn placeholder(id: MessageId) -> Self {
        Self {
            id,
            text: String::new(),
            sender: Sender::Agent,
            status: MessageStatus::Pending,
            translation: None,
            agent_type: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.sender == Sender::Agent && self.status == MessageStatus::Pending
    }

    pub fn is_final(&self) -> bool {
        self.status == MessageStatus::Final
    }
}

/// One completed question/answer round, exactly as the backend shaped it.
///
/// The entry is kept as raw JSON so the history sent back on the next query
/// is byte-for-byte what the backend returned: absent keys stay absent and
/// nulls stay null. Accessors only read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry(serde_json::Value);

impl HistoryEntry {
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }

    pub fn question(&self) -> Option<&str> {
        self.str_field("question")
    }

    pub fn answer(&self) -> Option<&str> {
        self.str_field("answer")
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.str_field("selectedFile")
    }

    pub fn agent_type(&self) -> Option<&str> {
        self.str_field("agent_type")
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }
}

impl From<serde_json::Value> for HistoryEntry {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
