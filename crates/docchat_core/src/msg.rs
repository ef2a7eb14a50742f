use crate::{
    AuthState, BatchId, FileScope, MessageId, QueryReply, RequestId, SpeechSource, SuggestionSeq,
    UploadFile,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Front-end is up; load the known files.
    Started,
    /// Authentication provider reported a new session state.
    SessionChanged(AuthState),
    /// User edited the prompt input.
    InputChanged(String),
    /// User submitted the current prompt input.
    QuerySubmitted,
    /// User picked a document scope.
    FileSelected(FileScope),
    /// User picked an autocomplete candidate by position.
    SuggestionPicked(usize),
    /// Backend returned the indexed documents.
    KnownFilesLoaded(Result<Vec<String>, String>),
    /// User chose files to upload as one batch.
    UploadRequested(Vec<UploadFile>),
    /// Simulated progress tick for a batch.
    UploadTicked { batch_id: BatchId, increment: u8 },
    /// Transport-reported progress for a batch, in percent.
    UploadProgressed { batch_id: BatchId, percent: u8 },
    /// Upload request finished.
    UploadSettled {
        batch_id: BatchId,
        result: Result<(), String>,
    },
    /// Display delay after settlement has elapsed.
    UploadCleanupDue { batch_id: BatchId },
    /// User closed one upload row.
    UploadDismissed { file_name: String },
    /// Backend answered (or failed) a query.
    QueryCompleted {
        request_id: RequestId,
        result: Result<QueryReply, String>,
    },
    /// Backend answered (or failed) a suggestion request.
    SuggestionsReceived {
        seq: SuggestionSeq,
        result: Result<Vec<String>, String>,
    },
    /// User asked for a translation; `None` uses the default language.
    TranslateRequested {
        message_id: MessageId,
        target_lang: Option<String>,
    },
    TranslationCompleted {
        message_id: MessageId,
        result: Result<String, String>,
    },
    /// User asked to hear a message.
    SpeakRequested {
        message_id: MessageId,
        source: SpeechSource,
    },
    /// Synthesis and playback finished.
    SpeechFinished {
        message_id: MessageId,
        result: Result<(), String>,
    },
}
