use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;

pub type BatchId = u64;
pub type RequestId = u64;
pub type MessageId = u64;
pub type SuggestionSeq = u64;

/// Everything the engine reports back to the front-end.
#[derive(Debug)]
pub enum EngineEvent {
    KnownFiles(Result<Vec<String>, BackendError>),
    UploadTick {
        batch_id: BatchId,
        increment: u8,
    },
    UploadProgress {
        batch_id: BatchId,
        percent: u8,
    },
    UploadSettled {
        batch_id: BatchId,
        result: Result<(), BackendError>,
    },
    CleanupDue {
        batch_id: BatchId,
    },
    QueryCompleted {
        request_id: RequestId,
        result: Result<QueryAnswer, BackendError>,
    },
    Suggestions {
        seq: SuggestionSeq,
        result: Result<Vec<String>, BackendError>,
    },
    Translated {
        message_id: MessageId,
        result: Result<String, BackendError>,
    },
    SpeechFinished {
        message_id: MessageId,
        result: Result<PathBuf, SpeechError>,
    },
}

/// A file to send in an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub file_name: String,
    pub path: PathBuf,
}

/// `POST /query` body. History entries are opaque: the backend owns their shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPayload {
    pub query: String,
    #[serde(rename = "selectedFile")]
    pub selected_file: Option<String>,
    pub chat_history: Vec<serde_json::Value>,
    pub user_identity: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryAnswer {
    pub answer: String,
    #[serde(default)]
    pub agent_type: String,
    #[serde(default)]
    pub chat_history: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestPayload {
    pub prefix: String,
    pub selected_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct UploadedFilesResponse {
    #[serde(default)]
    pub uploaded_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TranslatePayload<'a> {
    pub text: &'a str,
    pub target_lang: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SpeechPayload<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    UnsupportedContentType { content_type: String },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Synthesis or playback failure.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Audio(#[from] AudioError),
}
