use docchat_logging::{chat_debug, chat_warn};

use crate::{
    AppState, Effect, Msg, Notice, QueryOutcome, SubmitRejection, TranslationOutcome,
    UPLOAD_CLEANUP_DELAY,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::FetchKnownFiles],
        Msg::SessionChanged(auth) => {
            state.set_auth(auth);
            state.mark_dirty();
            Vec::new()
        }
        Msg::InputChanged(text) => {
            state.set_input(text);
            state.mark_dirty();
            refresh_suggestions(&mut state)
        }
        Msg::QuerySubmitted => submit_query(&mut state),
        Msg::FileSelected(scope) => {
            if let Err(rejection) = state.known_files().validate(&scope) {
                state.notify(Notice::error("Unknown File", rejection.to_string()));
                return (state, Vec::new());
            }
            state.set_scope(scope);
            state.suggestions_mut().invalidate();
            state.mark_dirty();
            refresh_suggestions(&mut state)
        }
        Msg::SuggestionPicked(index) => {
            let input = state.input().to_string();
            if let Some(next) = state.suggestions_mut().pick(&input, index) {
                state.set_input(next);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::KnownFilesLoaded(result) => {
            match result {
                Ok(files) => {
                    state.known_files_mut().replace(files);
                    state.mark_dirty();
                }
                Err(error) => {
                    chat_warn!("Error fetching uploaded files: {}", error);
                    state.notify(Notice::error("Error", "Failed to fetch uploaded files"));
                }
            }
            Vec::new()
        }
        Msg::UploadRequested(files) => match state.uploads_mut().start_batch(&files) {
            Some(batch_id) => {
                state.notify(Notice::info(
                    "Upload Started",
                    format!("Uploading {} file(s)...", files.len()),
                ));
                vec![Effect::StartUpload { batch_id, files }]
            }
            None => Vec::new(),
        },
        Msg::UploadTicked {
            batch_id,
            increment,
        } => {
            if state.uploads_mut().apply_tick(batch_id, increment) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadProgressed { batch_id, percent } => {
            if state
                .uploads_mut()
                .apply_transport_progress(batch_id, percent)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadSettled { batch_id, result } => {
            let success = result.is_ok();
            let count = state.uploads_mut().settle(batch_id, success);
            let mut effects = vec![Effect::ScheduleUploadCleanup {
                batch_id,
                delay: UPLOAD_CLEANUP_DELAY,
            }];
            match result {
                Ok(()) => {
                    state.notify(Notice::info(
                        "Upload Successful",
                        format!("{count} file(s) uploaded and processed successfully!"),
                    ));
                    effects.push(Effect::FetchKnownFiles);
                }
                Err(error) => {
                    chat_warn!("Upload batch {} failed: {}", batch_id, error);
                    state.notify(Notice::error(
                        "Upload Failed",
                        "Error uploading files. Please try again.",
                    ));
                }
            }
            effects
        }
        Msg::UploadCleanupDue { batch_id } => {
            if state.uploads_mut().purge(batch_id) > 0 {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadDismissed { file_name } => {
            if state.uploads_mut().dismiss(&file_name) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::QueryCompleted { request_id, result } => {
            let (pipeline, store) = state.pipeline_parts();
            match pipeline.complete(store, request_id, result) {
                QueryOutcome::Answered { follow_up, .. } => {
                    state.mark_dirty();
                    follow_up.map(Effect::Translate).into_iter().collect()
                }
                QueryOutcome::Failed { error, .. } => {
                    state.notify(Notice::error("Error processing query", error));
                    Vec::new()
                }
                QueryOutcome::Stale => Vec::new(),
            }
        }
        Msg::SuggestionsReceived { seq, result } => {
            if let Err(error) = &result {
                chat_warn!("Suggestion fetch failed: {}", error);
            }
            if state.suggestions_mut().apply_response(seq, result) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TranslateRequested {
            message_id,
            target_lang,
        } => {
            let lang = target_lang.unwrap_or_else(|| state.settings().default_target_lang.clone());
            let (pipeline, store) = state.pipeline_parts();
            match pipeline.request_translation(store, message_id, &lang) {
                Ok(request) => {
                    state.mark_dirty();
                    vec![Effect::Translate(request)]
                }
                Err(rejection) => {
                    state.notify(Notice::info("Translation", rejection.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::TranslationCompleted { message_id, result } => {
            let (pipeline, store) = state.pipeline_parts();
            match pipeline.complete_translation(store, message_id, result) {
                TranslationOutcome::Attached | TranslationOutcome::Ignored => state.mark_dirty(),
                TranslationOutcome::Failed(error) => {
                    state.notify(Notice::error("Translation Failed", error));
                }
            }
            Vec::new()
        }
        Msg::SpeakRequested { message_id, source } => {
            let (pipeline, store) = state.pipeline_parts();
            match pipeline.request_speech(store, message_id, source) {
                Ok(request) => {
                    state.mark_dirty();
                    vec![Effect::Synthesize(request)]
                }
                Err(rejection) => {
                    state.notify(Notice::info("Speech", rejection.to_string()));
                    Vec::new()
                }
            }
        }
        Msg::SpeechFinished { message_id, result } => {
            let (pipeline, _) = state.pipeline_parts();
            pipeline.complete_speech(message_id);
            match result {
                Ok(()) => state.mark_dirty(),
                Err(error) => {
                    chat_warn!("Speech for message {} failed: {}", message_id, error);
                    state.notify(Notice::error("Speech Failed", error));
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn submit_query(state: &mut AppState) -> Vec<Effect> {
    let question = state.input().to_string();
    let (pipeline, store, ctx) = state.query_parts();
    match pipeline.submit(store, ctx, &question) {
        Ok(request) => {
            state.set_input(String::new());
            state.suggestions_mut().invalidate();
            state.mark_dirty();
            vec![Effect::SubmitQuery(request)]
        }
        Err(SubmitRejection::EmptyQuestion) => Vec::new(),
        Err(SubmitRejection::AnswerPending) => {
            chat_debug!("Query ignored: an answer is still pending");
            Vec::new()
        }
        Err(rejection @ SubmitRejection::UnknownDocument(_)) => {
            state.notify(Notice::error("Select File", rejection.to_string()));
            Vec::new()
        }
    }
}

fn refresh_suggestions(state: &mut AppState) -> Vec<Effect> {
    let (suggestions, input, scope) = state.suggestion_parts();
    suggestions
        .on_input_changed(input, scope)
        .map(Effect::FetchSuggestions)
        .into_iter()
        .collect()
}
