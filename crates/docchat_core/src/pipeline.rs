//! Query pipeline: one question/answer round trip plus per-message
//! translation and speech requests.
//!
//! Phases run `Idle -> Submitting -> (Translating)? -> Idle`. A query can only
//! be submitted while no placeholder is pending, which serializes queries.

use std::collections::BTreeSet;

use docchat_logging::{chat_debug, chat_info, chat_warn};
use thiserror::Error;

use crate::message::{HistoryEntry, MessageId};
use crate::session::{FileScope, KnownFiles};
use crate::store::ConversationStore;

pub type RequestId = u64;

/// Text shown on an agent message whose query failed.
pub const QUERY_FAILED_TEXT: &str = "Error processing query";

/// Caller-side context for a submission, passed explicitly rather than read from globals.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub scope: &'a FileScope,
    pub known_files: &'a KnownFiles,
    pub identity: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub request_id: RequestId,
    pub placeholder: MessageId,
    pub question: String,
    /// `None` searches across all known files.
    pub selected_file: Option<String>,
    pub history: Vec<HistoryEntry>,
    /// Empty when the caller is anonymous.
    pub user_identity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryReply {
    pub answer: String,
    pub agent_type: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub message_id: MessageId,
    pub text: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechSource {
    Original,
    Translation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub message_id: MessageId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Submitting {
        request_id: RequestId,
        placeholder: MessageId,
    },
    Translating {
        message_id: MessageId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejection {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("an answer is still pending")]
    AnswerPending,
    #[error("document {0:?} is not available")]
    UnknownDocument(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateRejection {
    #[error("message {0} does not exist")]
    UnknownMessage(MessageId),
    #[error("message {0} is not a final answer")]
    NotFinal(MessageId),
    #[error("message {0} is already translated")]
    AlreadyTranslated(MessageId),
    #[error("message {0} is already being translated")]
    InFlight(MessageId),
    #[error("target language is empty")]
    EmptyLanguage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechRejection {
    #[error("message {0} does not exist")]
    UnknownMessage(MessageId),
    #[error("message {0} is not final")]
    NotFinal(MessageId),
    #[error("message {0} has no translation")]
    NoTranslation(MessageId),
    #[error("message {0} is already being spoken")]
    InFlight(MessageId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered {
        message_id: MessageId,
        follow_up: Option<TranslateRequest>,
    },
    Failed {
        message_id: MessageId,
        error: String,
    },
    /// Completion for a request that is no longer outstanding.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    Attached,
    /// The message already had a translation or is gone; the result was dropped.
    Ignored,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPipeline {
    phase: QueryPhase,
    next_request_id: RequestId,
    auto_translate: Option<String>,
    translations_in_flight: BTreeSet<MessageId>,
    speech_in_flight: BTreeSet<MessageId>,
}

impl Default for QueryPipeline {
    fn default() -> Self {
        Self::new(None)
    }
}

impl QueryPipeline {
    /// `auto_translate` names a language every new answer is translated into.
    pub fn new(auto_translate: Option<String>) -> Self {
        Self {
            phase: QueryPhase::Idle,
            next_request_id: 0,
            auto_translate: auto_translate.filter(|lang| !lang.trim().is_empty()),
            translations_in_flight: BTreeSet::new(),
            speech_in_flight: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> &QueryPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, QueryPhase::Submitting { .. })
    }

    pub fn is_translating(&self, message_id: MessageId) -> bool {
        self.translations_in_flight.contains(&message_id)
    }

    pub fn is_speaking(&self, message_id: MessageId) -> bool {
        self.speech_in_flight.contains(&message_id)
    }

    /// Validates the question, inserts the optimistic placeholder and builds the request.
    pub fn submit(
        &mut self,
        store: &mut ConversationStore,
        ctx: QueryContext<'_>,
        question: &str,
    ) -> Result<QueryRequest, SubmitRejection> {
        if question.trim().is_empty() {
            return Err(SubmitRejection::EmptyQuestion);
        }
        if self.is_submitting() || store.pending_placeholder().is_some() {
            return Err(SubmitRejection::AnswerPending);
        }
        if let Some(document) = ctx.scope.document() {
            if !ctx.known_files.contains(document) {
                return Err(SubmitRejection::UnknownDocument(document.to_string()));
            }
        }

        let placeholder = store.append_user_and_placeholder(question);
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.phase = QueryPhase::Submitting {
            request_id,
            placeholder,
        };
        chat_info!(
            "Query {} submitted (scope={:?}, history={})",
            request_id,
            ctx.scope,
            store.history().len()
        );

        Ok(QueryRequest {
            request_id,
            placeholder,
            question: question.to_string(),
            selected_file: ctx.scope.document().map(ToOwned::to_owned),
            history: store.history().to_vec(),
            user_identity: ctx.identity.unwrap_or_default().to_string(),
        })
    }

    /// Settles the outstanding query. The placeholder never stays pending.
    pub fn complete(
        &mut self,
        store: &mut ConversationStore,
        request_id: RequestId,
        result: Result<QueryReply, String>,
    ) -> QueryOutcome {
        let placeholder = match self.phase {
            QueryPhase::Submitting {
                request_id: current,
                placeholder,
            } if current == request_id => placeholder,
            _ => {
                chat_debug!("Ignoring completion for stale query {}", request_id);
                return QueryOutcome::Stale;
            }
        };

        match result {
            Ok(reply) => {
                store.resolve_placeholder(placeholder, &reply.answer, None);
                if !reply.agent_type.is_empty() {
                    store.set_agent_type(placeholder, &reply.agent_type);
                }
                store.replace_history(reply.history);
                self.phase = QueryPhase::Idle;
                chat_info!("Query {} answered by {:?}", request_id, reply.agent_type);

                let follow_up = self
                    .auto_translate
                    .clone()
                    .and_then(|lang| self.request_translation(store, placeholder, &lang).ok());
                if follow_up.is_some() {
                    self.phase = QueryPhase::Translating {
                        message_id: placeholder,
                    };
                }
                QueryOutcome::Answered {
                    message_id: placeholder,
                    follow_up,
                }
            }
            Err(error) => {
                chat_warn!("Query {} failed: {}", request_id, error);
                store.fail_placeholder(placeholder, QUERY_FAILED_TEXT);
                self.phase = QueryPhase::Idle;
                QueryOutcome::Failed {
                    message_id: placeholder,
                    error,
                }
            }
        }
    }

    /// Translation of an already-final message, independent of any running query.
    pub fn request_translation(
        &mut self,
        store: &ConversationStore,
        message_id: MessageId,
        target_lang: &str,
    ) -> Result<TranslateRequest, TranslateRejection> {
        let target_lang = target_lang.trim();
        if target_lang.is_empty() {
            return Err(TranslateRejection::EmptyLanguage);
        }
        let message = store
            .message(message_id)
            .ok_or(TranslateRejection::UnknownMessage(message_id))?;
        if !message.is_final() {
            return Err(TranslateRejection::NotFinal(message_id));
        }
        if message.translation.is_some() {
            return Err(TranslateRejection::AlreadyTranslated(message_id));
        }
        if !self.translations_in_flight.insert(message_id) {
            return Err(TranslateRejection::InFlight(message_id));
        }
        Ok(TranslateRequest {
            message_id,
            text: message.text.clone(),
            target_lang: target_lang.to_string(),
        })
    }

    pub fn complete_translation(
        &mut self,
        store: &mut ConversationStore,
        message_id: MessageId,
        result: Result<String, String>,
    ) -> TranslationOutcome {
        self.translations_in_flight.remove(&message_id);
        if self.phase == (QueryPhase::Translating { message_id }) {
            self.phase = QueryPhase::Idle;
        }
        match result {
            Ok(translated) => {
                if store.attach_translation(message_id, &translated) {
                    TranslationOutcome::Attached
                } else {
                    chat_debug!("Dropping translation for message {}", message_id);
                    TranslationOutcome::Ignored
                }
            }
            Err(error) => {
                chat_warn!("Translation of message {} failed: {}", message_id, error);
                TranslationOutcome::Failed(error)
            }
        }
    }

    /// Speech for the original text or the stored translation of a final message.
    pub fn request_speech(
        &mut self,
        store: &ConversationStore,
        message_id: MessageId,
        source: SpeechSource,
    ) -> Result<SpeechRequest, SpeechRejection> {
        let message = store
            .message(message_id)
            .ok_or(SpeechRejection::UnknownMessage(message_id))?;
        if !message.is_final() {
            return Err(SpeechRejection::NotFinal(message_id));
        }
        let text = match source {
            SpeechSource::Original => message.text.clone(),
            SpeechSource::Translation => message
                .translation
                .clone()
                .ok_or(SpeechRejection::NoTranslation(message_id))?,
        };
        if !self.speech_in_flight.insert(message_id) {
            return Err(SpeechRejection::InFlight(message_id));
        }
        Ok(SpeechRequest { message_id, text })
    }

    pub fn complete_speech(&mut self, message_id: MessageId) -> bool {
        self.speech_in_flight.remove(&message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageStatus;

    fn known(files: &[&str]) -> KnownFiles {
        let mut known = KnownFiles::new();
        known.replace(files.iter().map(|f| f.to_string()).collect());
        known
    }

    fn reply(answer: &str) -> QueryReply {
        QueryReply {
            answer: answer.to_string(),
            agent_type: "common".to_string(),
            history: vec![HistoryEntry::from(
                serde_json::json!({"question": "q", "answer": answer}),
            )],
        }
    }

    #[test]
    fn submit_builds_request_with_identity_and_scope() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = known(&["report.pdf"]);
        let scope = FileScope::Document("report.pdf".to_string());
        let ctx = QueryContext {
            scope: &scope,
            known_files: &files,
            identity: Some("ada@example.com"),
        };

        let request = pipeline.submit(&mut store, ctx, "what?").unwrap();
        assert_eq!(request.selected_file.as_deref(), Some("report.pdf"));
        assert_eq!(request.user_identity, "ada@example.com");
        assert_eq!(request.placeholder, store.pending_placeholder().unwrap());
        assert!(pipeline.is_submitting());
    }

    #[test]
    fn anonymous_all_files_query() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "hi").unwrap();
        assert_eq!(request.selected_file, None);
        assert_eq!(request.user_identity, "");
    }

    #[test]
    fn unknown_document_rejected_without_mutation() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = known(&["a.pdf"]);
        let scope = FileScope::Document("gone.pdf".to_string());
        let ctx = QueryContext {
            scope: &scope,
            known_files: &files,
            identity: None,
        };
        assert_eq!(
            pipeline.submit(&mut store, ctx, "hi"),
            Err(SubmitRejection::UnknownDocument("gone.pdf".to_string()))
        );
        assert!(store.messages().is_empty());
    }

    #[test]
    fn second_submit_rejected_while_pending() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        pipeline.submit(&mut store, ctx, "one").unwrap();
        assert_eq!(
            pipeline.submit(&mut store, ctx, "two"),
            Err(SubmitRejection::AnswerPending)
        );
        assert_eq!(store.messages().len(), 2);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "one").unwrap();
        assert_eq!(
            pipeline.complete(&mut store, request.request_id + 7, Ok(reply("x"))),
            QueryOutcome::Stale
        );
        assert!(store.pending_placeholder().is_some());
    }

    #[test]
    fn failure_resolves_placeholder_to_failed() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "one").unwrap();
        let outcome = pipeline.complete(&mut store, request.request_id, Err("timeout".to_string()));

        assert!(matches!(outcome, QueryOutcome::Failed { .. }));
        let message = store.message(request.placeholder).unwrap();
        assert_eq!(message.status, MessageStatus::Failed);
        assert_eq!(message.text, QUERY_FAILED_TEXT);
        assert_eq!(pipeline.phase(), &QueryPhase::Idle);
        assert!(store.history().is_empty());
    }

    #[test]
    fn auto_translate_enters_translating_phase() {
        let mut pipeline = QueryPipeline::new(Some("ta".to_string()));
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "one").unwrap();
        let outcome = pipeline.complete(&mut store, request.request_id, Ok(reply("42")));

        let (message_id, follow_up) = match outcome {
            QueryOutcome::Answered {
                message_id,
                follow_up,
            } => (message_id, follow_up),
            other => panic!("expected answer, got {other:?}"),
        };
        let follow_up = follow_up.expect("auto translation");
        assert_eq!(follow_up.text, "42");
        assert_eq!(follow_up.target_lang, "ta");
        assert_eq!(pipeline.phase(), &QueryPhase::Translating { message_id });

        let translated = Ok("நாற்பத்திரண்டு".to_string());
        let outcome = pipeline.complete_translation(&mut store, message_id, translated);
        assert_eq!(outcome, TranslationOutcome::Attached);
        assert_eq!(pipeline.phase(), &QueryPhase::Idle);
    }

    #[test]
    fn translation_rejections() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "one").unwrap();
        let id = request.placeholder;

        assert_eq!(
            pipeline.request_translation(&store, id, "ta"),
            Err(TranslateRejection::NotFinal(id))
        );
        assert_eq!(
            pipeline.request_translation(&store, 99, "ta"),
            Err(TranslateRejection::UnknownMessage(99))
        );

        pipeline.complete(&mut store, request.request_id, Ok(reply("42")));
        assert!(pipeline.request_translation(&store, id, "ta").is_ok());
        assert_eq!(
            pipeline.request_translation(&store, id, "ta"),
            Err(TranslateRejection::InFlight(id))
        );
        pipeline.complete_translation(&mut store, id, Ok("x".to_string()));
        assert_eq!(
            pipeline.request_translation(&store, id, "fr"),
            Err(TranslateRejection::AlreadyTranslated(id))
        );
        assert_eq!(
            pipeline.request_translation(&store, id, "  "),
            Err(TranslateRejection::EmptyLanguage)
        );
    }

    #[test]
    fn speech_uses_translation_when_asked() {
        let mut pipeline = QueryPipeline::default();
        let mut store = ConversationStore::new();
        let files = KnownFiles::new();
        let ctx = QueryContext {
            scope: &FileScope::AllFiles,
            known_files: &files,
            identity: None,
        };
        let request = pipeline.submit(&mut store, ctx, "one").unwrap();
        let id = request.placeholder;
        pipeline.complete(&mut store, request.request_id, Ok(reply("42")));

        assert_eq!(
            pipeline.request_speech(&store, id, SpeechSource::Translation),
            Err(SpeechRejection::NoTranslation(id))
        );
        store.attach_translation(id, "நாற்பத்திரண்டு");
        let speech = pipeline
            .request_speech(&store, id, SpeechSource::Translation)
            .unwrap();
        assert_eq!(speech.text, "நாற்பத்திரண்டு");
        assert_eq!(
            pipeline.request_speech(&store, id, SpeechSource::Original),
            Err(SpeechRejection::InFlight(id))
        );
        assert!(pipeline.complete_speech(id));
        assert!(pipeline.request_speech(&store, id, SpeechSource::Original).is_ok());
    }
}
