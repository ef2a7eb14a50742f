use std::sync::mpsc;
use std::thread;

use docchat_core::{Effect, HistoryEntry, Msg, QueryReply, QueryRequest, SuggestRequest};
use docchat_engine::{
    EngineEvent, EngineEvents, EngineHandle, QueryAnswer, QueryPayload, SuggestPayload,
    UploadSource,
};
use docchat_logging::{chat_debug, chat_info, chat_warn};

use super::app::AppEvent;

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, events: EngineEvents, app_tx: mpsc::Sender<AppEvent>) -> Self {
        spawn_event_loop(events, app_tx);
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchKnownFiles => self.engine.fetch_known_files(),
                Effect::StartUpload { batch_id, files } => {
                    chat_info!("StartUpload batch_id={} files={}", batch_id, files.len());
                    let sources = files
                        .into_iter()
                        .map(|file| UploadSource {
                            file_name: file.file_name,
                            path: file.path,
                        })
                        .collect();
                    self.engine.upload(batch_id, sources);
                }
                Effect::ScheduleUploadCleanup { batch_id, delay } => {
                    self.engine.schedule_cleanup(batch_id, delay);
                }
                Effect::SubmitQuery(request) => {
                    chat_info!(
                        "SubmitQuery request_id={} question_len={} history={}",
                        request.request_id,
                        request.question.len(),
                        request.history.len()
                    );
                    let request_id = request.request_id;
                    self.engine.query(request_id, query_payload(request));
                }
                Effect::FetchSuggestions(request) => {
                    let seq = request.seq;
                    self.engine.suggest(seq, suggest_payload(request));
                }
                Effect::Translate(request) => {
                    self.engine
                        .translate(request.message_id, request.text, request.target_lang);
                }
                Effect::Synthesize(request) => {
                    self.engine.speak(request.message_id, request.text);
                }
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if app_tx.send(AppEvent::Engine(event_to_msg(event))).is_err() {
                break;
            }
        }
    });
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::KnownFiles(result) => Msg::KnownFilesLoaded(result.map_err(|e| e.to_string())),
        EngineEvent::UploadTick {
            batch_id,
            increment,
        } => Msg::UploadTicked {
            batch_id,
            increment,
        },
        EngineEvent::UploadProgress { batch_id, percent } => {
            Msg::UploadProgressed { batch_id, percent }
        }
        EngineEvent::UploadSettled { batch_id, result } => Msg::UploadSettled {
            batch_id,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::CleanupDue { batch_id } => Msg::UploadCleanupDue { batch_id },
        EngineEvent::QueryCompleted { request_id, result } => {
            if let Err(err) = &result {
                chat_warn!("Query {} failed: {}", request_id, err);
            }
            Msg::QueryCompleted {
                request_id,
                result: result.map(query_reply).map_err(|e| e.to_string()),
            }
        }
        EngineEvent::Suggestions { seq, result } => Msg::SuggestionsReceived {
            seq,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::Translated { message_id, result } => {
            if let Err(err) = &result {
                chat_warn!("Translation of message {} failed: {}", message_id, err);
            }
            Msg::TranslationCompleted {
                message_id,
                result: result.map_err(|e| e.to_string()),
            }
        }
        EngineEvent::SpeechFinished { message_id, result } => {
            let result = match result {
                Ok(clip) => {
                    chat_debug!("Message {} spoken from {:?}", message_id, clip);
                    Ok(())
                }
                Err(err) => Err(err.to_string()),
            };
            Msg::SpeechFinished { message_id, result }
        }
    }
}

fn query_payload(request: QueryRequest) -> QueryPayload {
    QueryPayload {
        query: request.question,
        selected_file: request.selected_file,
        chat_history: request
            .history
            .into_iter()
            .map(HistoryEntry::into_value)
            .collect(),
        user_identity: request.user_identity,
    }
}

fn query_reply(answer: QueryAnswer) -> QueryReply {
    QueryReply {
        answer: answer.answer,
        agent_type: answer.agent_type,
        history: answer
            .chat_history
            .into_iter()
            .map(HistoryEntry::from)
            .collect(),
    }
}

fn suggest_payload(request: SuggestRequest) -> SuggestPayload {
    SuggestPayload {
        prefix: request.prefix,
        selected_file: request.document,
    }
}
