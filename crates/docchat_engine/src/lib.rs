//! Docchat engine: backend IO and effect execution off the UI thread.
mod audio;
mod backend;
mod engine;
mod filename;
mod http;
mod persist;
mod speech;
mod ticker;
mod translate;
mod types;
mod upload;

pub use audio::{AudioError, AudioPlayer, ClipPlayer};
pub use backend::{
    BackendSettings, ChannelProgressSink, DocumentBackend, ProgressSink, ReqwestBackend,
};
pub use engine::{EngineEvents, EngineHandle, EngineServices};
pub use filename::clip_filename;
pub use persist::PersistError;
pub use speech::{ReqwestSpeechClient, SpeechClient};
pub use ticker::ProgressTicker;
pub use translate::{ReqwestTranslationClient, TranslationClient};
pub use types::{
    BackendError, BatchId, EngineEvent, FailureKind, MessageId, QueryAnswer, QueryPayload,
    RequestId, SpeechError, SuggestPayload, SuggestionSeq, UploadSource,
};
