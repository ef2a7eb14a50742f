#![allow(dead_code)]

use std::sync::Once;

use docchat_core::{update, AppState, Effect, FileScope, Msg, QueryRequest};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docchat_logging::initialize_for_tests);
}

pub fn submit(state: AppState, question: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::InputChanged(question.to_string()));
    update(state, Msg::QuerySubmitted)
}

pub fn submitted_query(effects: &[Effect]) -> QueryRequest {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SubmitQuery(request) => Some(request.clone()),
            _ => None,
        })
        .expect("submit effect")
}

pub fn with_known_files(state: AppState, files: &[&str]) -> AppState {
    let (state, _) = update(
        state,
        Msg::KnownFilesLoaded(Ok(files.iter().map(|f| f.to_string()).collect())),
    );
    state
}

pub fn select(state: AppState, document: &str) -> AppState {
    let (state, _) = update(state, Msg::FileSelected(FileScope::Document(document.to_string())));
    state
}
