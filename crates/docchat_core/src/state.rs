use crate::pipeline::QueryContext;
use crate::view_model::{AppViewModel, MessageView, UploadRowView, PENDING_TEXT};
use crate::{
    AuthState, ConversationStore, FileScope, KnownFiles, MessageStatus, QueryPipeline,
    SuggestionFetcher, UploadTracker,
};

/// Language used when a translation is requested without one.
pub const DEFAULT_TARGET_LANG: &str = "ta";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSettings {
    pub default_target_lang: String,
    /// Translate every new answer into this language.
    pub auto_translate: Option<String>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            default_target_lang: DEFAULT_TARGET_LANG.to_string(),
            auto_translate: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible notification, drained by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    conversation: ConversationStore,
    pipeline: QueryPipeline,
    uploads: UploadTracker,
    suggestions: SuggestionFetcher,
    known_files: KnownFiles,
    scope: FileScope,
    auth: AuthState,
    input: String,
    notices: Vec<Notice>,
    settings: CoreSettings,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            pipeline: QueryPipeline::new(settings.auto_translate.clone()),
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let messages = self
            .conversation
            .messages()
            .iter()
            .map(|message| MessageView {
                id: message.id,
                sender: message.sender,
                status: message.status,
                text: if message.status == MessageStatus::Pending {
                    PENDING_TEXT.to_string()
                } else {
                    message.text.clone()
                },
                translation: message.translation.clone(),
                agent_type: message.agent_type.clone(),
                translating: self.pipeline.is_translating(message.id),
                speaking: self.pipeline.is_speaking(message.id),
            })
            .collect();
        let uploads = self
            .uploads
            .items()
            .iter()
            .map(UploadRowView::from_item)
            .collect();
        let answer_pending = self.conversation.pending_placeholder().is_some();

        AppViewModel {
            user: self.auth.display_name().map(ToOwned::to_owned),
            signed_in: matches!(self.auth, AuthState::SignedIn(_)),
            messages,
            uploads,
            suggestions: self.suggestions.candidates().to_vec(),
            known_files: self.known_files.as_slice().to_vec(),
            scope: self.scope.clone(),
            input: self.input.clone(),
            can_submit: !answer_pending && !self.input.trim().is_empty(),
            answer_pending,
            history_len: self.conversation.history().len(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.uploads
    }

    pub fn suggestions(&self) -> &SuggestionFetcher {
        &self.suggestions
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn known_files(&self) -> &KnownFiles {
        &self.known_files
    }

    pub fn scope(&self) -> &FileScope {
        &self.scope
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.dirty = true;
    }

    pub(crate) fn set_auth(&mut self, auth: AuthState) {
        self.auth = auth;
    }

    pub(crate) fn set_scope(&mut self, scope: FileScope) {
        self.scope = scope;
    }

    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    pub(crate) fn known_files_mut(&mut self) -> &mut KnownFiles {
        &mut self.known_files
    }

    pub(crate) fn uploads_mut(&mut self) -> &mut UploadTracker {
        &mut self.uploads
    }

    /// Split borrow: the store and pipeline mutably, the context read-only.
    pub(crate) fn query_parts(
        &mut self,
    ) -> (&mut QueryPipeline, &mut ConversationStore, QueryContext<'_>) {
        let ctx = QueryContext {
            scope: &self.scope,
            known_files: &self.known_files,
            identity: self.auth.identity(),
        };
        (&mut self.pipeline, &mut self.conversation, ctx)
    }

    pub(crate) fn pipeline_parts(&mut self) -> (&mut QueryPipeline, &mut ConversationStore) {
        (&mut self.pipeline, &mut self.conversation)
    }

    pub(crate) fn suggestion_parts(&mut self) -> (&mut SuggestionFetcher, &str, &FileScope) {
        (&mut self.suggestions, &self.input, &self.scope)
    }

    pub(crate) fn suggestions_mut(&mut self) -> &mut SuggestionFetcher {
        &mut self.suggestions
    }
}
