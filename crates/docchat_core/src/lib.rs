//! Docchat core: pure conversation state machine and view-model helpers.
mod effect;
mod message;
mod msg;
mod pipeline;
mod session;
mod state;
mod store;
mod suggest;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use message::{ChatMessage, HistoryEntry, MessageId, MessageStatus, Sender};
pub use msg::Msg;
pub use pipeline::{
    QueryContext, QueryOutcome, QueryPhase, QueryPipeline, QueryReply, QueryRequest, RequestId,
    SpeechRejection, SpeechRequest, SpeechSource, SubmitRejection, TranslateRejection,
    TranslateRequest, TranslationOutcome, QUERY_FAILED_TEXT,
};
pub use session::{AuthState, FileScope, KnownFiles, SelectionRejection, Session};
pub use state::{AppState, CoreSettings, Notice, NoticeLevel, DEFAULT_TARGET_LANG};
pub use store::ConversationStore;
pub use suggest::{last_word, replace_last_word, SuggestRequest, SuggestionFetcher, SuggestionSeq};
pub use update::update;
pub use upload::{
    BatchId, UploadFile, UploadItem, UploadStatus, UploadTracker, SIMULATED_PROGRESS_CAP,
    UPLOAD_CLEANUP_DELAY,
};
pub use view_model::{AppViewModel, MessageView, UploadRowView, PENDING_TEXT};
