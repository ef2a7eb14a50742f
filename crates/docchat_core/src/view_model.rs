use crate::{FileScope, MessageId, MessageStatus, Sender, UploadItem, UploadStatus};

/// Shown in place of an answer that is still being computed.
pub const PENDING_TEXT: &str = "Processing your query...";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub user: Option<String>,
    pub signed_in: bool,
    pub messages: Vec<MessageView>,
    pub uploads: Vec<UploadRowView>,
    pub suggestions: Vec<String>,
    pub known_files: Vec<String>,
    pub scope: FileScope,
    pub input: String,
    pub can_submit: bool,
    pub answer_pending: bool,
    pub history_len: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: MessageId,
    pub sender: Sender,
    pub status: MessageStatus,
    pub text: String,
    pub translation: Option<String>,
    pub agent_type: Option<String>,
    pub translating: bool,
    pub speaking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRowView {
    pub file_name: String,
    pub progress: u8,
    pub status: UploadStatus,
    pub label: &'static str,
}

impl UploadRowView {
    pub(crate) fn from_item(item: &UploadItem) -> Self {
        let label = match item.status {
            UploadStatus::Uploading => "Uploading...",
            UploadStatus::Success => "Upload complete",
            UploadStatus::Error => "Upload failed",
        };
        Self {
            file_name: item.file_name.clone(),
            progress: item.progress,
            status: item.status,
            label,
        }
    }
}
