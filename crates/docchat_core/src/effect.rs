use std::time::Duration;

use crate::{BatchId, QueryRequest, SpeechRequest, SuggestRequest, TranslateRequest, UploadFile};

/// Side effects requested by [`crate::update`]; executed by the front-end's engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchKnownFiles,
    /// Upload one batch; the executor also drives the simulated-progress ticker
    /// for the batch until the request settles.
    StartUpload {
        batch_id: BatchId,
        files: Vec<UploadFile>,
    },
    /// Deliver `Msg::UploadCleanupDue` for the batch after `delay`.
    ScheduleUploadCleanup {
        batch_id: BatchId,
        delay: Duration,
    },
    SubmitQuery(QueryRequest),
    FetchSuggestions(SuggestRequest),
    Translate(TranslateRequest),
    /// Synthesize and play the text immediately.
    Synthesize(SpeechRequest),
}
