mod support;

use docchat_core::{update, AppState, Effect, FileScope, Msg, SuggestRequest};
use pretty_assertions::assert_eq;
use support::{init_logging, select, with_known_files};

fn type_text(state: AppState, text: &str) -> (AppState, Option<SuggestRequest>) {
    let (state, effects) = update(state, Msg::InputChanged(text.to_string()));
    let request = effects.into_iter().find_map(|effect| match effect {
        Effect::FetchSuggestions(request) => Some(request),
        _ => None,
    });
    (state, request)
}

fn scoped_state() -> AppState {
    let state = with_known_files(AppState::new(), &["report.pdf"]);
    select(state, "report.pdf")
}

#[test]
fn no_fetch_when_searching_all_files() {
    init_logging();
    let (state, request) = type_text(AppState::new(), "give me a sum");
    assert_eq!(request, None);
    assert!(state.view().suggestions.is_empty());
}

#[test]
fn fetch_uses_last_word_and_document() {
    init_logging();
    let (_state, request) = type_text(scoped_state(), "give me a sum");
    let request = request.expect("suggest effect");
    assert_eq!(request.prefix, "sum");
    assert_eq!(request.document, "report.pdf");
}

#[test]
fn stale_response_is_discarded() {
    init_logging();
    let (state, doc) = type_text(scoped_state(), "doc");
    let (state, docu) = type_text(state, "docu");
    let (doc, docu) = (doc.unwrap(), docu.unwrap());

    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: docu.seq,
            result: Ok(vec!["document".to_string()]),
        },
    );
    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: doc.seq,
            result: Ok(vec!["doctor".to_string(), "docket".to_string()]),
        },
    );
    assert_eq!(state.view().suggestions, vec!["document"]);
}

#[test]
fn picking_replaces_trailing_fragment() {
    init_logging();
    let (state, request) = type_text(scoped_state(), "give me a sum");
    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: request.unwrap().seq,
            result: Ok(vec!["summary".to_string(), "sums".to_string()]),
        },
    );
    let (state, effects) = update(state, Msg::SuggestionPicked(0));

    assert!(effects.is_empty());
    assert_eq!(state.input(), "give me a summary ");
    assert!(state.view().suggestions.is_empty());
}

#[test]
fn empty_response_clears_list() {
    init_logging();
    let (state, first) = type_text(scoped_state(), "su");
    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: first.unwrap().seq,
            result: Ok(vec!["summary".to_string()]),
        },
    );
    let (state, second) = type_text(state, "sux");
    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: second.unwrap().seq,
            result: Ok(Vec::new()),
        },
    );
    assert!(state.view().suggestions.is_empty());
}

#[test]
fn switching_to_all_files_drops_in_flight_suggestions() {
    init_logging();
    let (state, request) = type_text(scoped_state(), "sum");
    let (state, effects) = update(state, Msg::FileSelected(FileScope::AllFiles));
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: request.unwrap().seq,
            result: Ok(vec!["summary".to_string()]),
        },
    );
    assert!(state.view().suggestions.is_empty());
}

#[test]
fn submitting_clears_input_and_suggestions() {
    init_logging();
    let (state, request) = type_text(scoped_state(), "sum");
    let (state, _) = update(
        state,
        Msg::SuggestionsReceived {
            seq: request.unwrap().seq,
            result: Ok(vec!["summary".to_string()]),
        },
    );
    let (state, _) = update(state, Msg::QuerySubmitted);
    let view = state.view();
    assert_eq!(view.input, "");
    assert!(view.suggestions.is_empty());
}
