use docchat_logging::chat_debug;

use crate::session::FileScope;

/// Monotonic number identifying one suggestion request.
pub type SuggestionSeq = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub seq: SuggestionSeq,
    pub prefix: String,
    pub document: String,
}

/// Autocomplete candidates for the word being typed.
///
/// Every request gets a fresh sequence number; only the response to the most
/// recently issued request is applied, so a slow answer to an earlier
/// keystroke cannot overwrite a newer list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionFetcher {
    last_issued: SuggestionSeq,
    candidates: Vec<String>,
}

impl SuggestionFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a request when a document is selected and a word fragment exists.
    /// Otherwise the list is cleared and in-flight requests become stale.
    pub fn on_input_changed(&mut self, input: &str, scope: &FileScope) -> Option<SuggestRequest> {
        let fragment = last_word(input);
        match scope.document() {
            Some(document) if !fragment.is_empty() => {
                self.last_issued += 1;
                Some(SuggestRequest {
                    seq: self.last_issued,
                    prefix: fragment.to_string(),
                    document: document.to_string(),
                })
            }
            _ => {
                self.invalidate();
                None
            }
        }
    }

    /// Applies a response; `false` when it was stale and discarded.
    pub fn apply_response(
        &mut self,
        seq: SuggestionSeq,
        result: Result<Vec<String>, String>,
    ) -> bool {
        if seq != self.last_issued {
            chat_debug!(
                "Discarding stale suggestions seq={} (latest={})",
                seq,
                self.last_issued
            );
            return false;
        }
        self.candidates = result.unwrap_or_default();
        true
    }

    /// Clears the list and makes every outstanding request stale.
    pub fn invalidate(&mut self) {
        self.last_issued += 1;
        self.candidates.clear();
    }

    /// Replaces the trailing word of `input` with the chosen candidate.
    pub fn pick(&mut self, input: &str, index: usize) -> Option<String> {
        let word = self.candidates.get(index)?.clone();
        self.invalidate();
        Some(replace_last_word(input, &word))
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn last_issued(&self) -> SuggestionSeq {
        self.last_issued
    }
}

/// Last space-separated word of the trimmed input, possibly empty.
pub fn last_word(input: &str) -> &str {
    input.trim().rsplit(' ').next().unwrap_or("")
}

/// `"give me a sum"` + `"summary"` -> `"give me a summary "`.
pub fn replace_last_word(input: &str, word: &str) -> String {
    let mut words: Vec<&str> = input.trim().split(' ').collect();
    words.pop();
    words.push(word);
    let mut replaced = words.join(" ");
    replaced.push(' ');
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_scope() -> FileScope {
        FileScope::Document("report.pdf".to_string())
    }

    #[test]
    fn last_word_uses_trimmed_input() {
        assert_eq!(last_word("give me a sum"), "sum");
        assert_eq!(last_word("  give me  "), "me");
        assert_eq!(last_word("   "), "");
    }

    #[test]
    fn replace_last_word_appends_space() {
        assert_eq!(
            replace_last_word("give me a sum", "summary"),
            "give me a summary "
        );
        assert_eq!(replace_last_word("sum", "summary"), "summary ");
        assert_eq!(replace_last_word("", "summary"), "summary ");
    }

    #[test]
    fn no_request_without_document_or_fragment() {
        let mut fetcher = SuggestionFetcher::new();
        assert_eq!(fetcher.on_input_changed("sum", &FileScope::AllFiles), None);
        assert_eq!(fetcher.on_input_changed("   ", &doc_scope()), None);
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_list() {
        let mut fetcher = SuggestionFetcher::new();
        let doc = fetcher.on_input_changed("doc", &doc_scope()).unwrap();
        let docu = fetcher.on_input_changed("docu", &doc_scope()).unwrap();
        assert!(docu.seq > doc.seq);

        assert!(fetcher.apply_response(docu.seq, Ok(vec!["document".to_string()])));
        assert!(!fetcher.apply_response(doc.seq, Ok(vec!["doctor".to_string()])));
        assert_eq!(fetcher.candidates(), &["document".to_string()]);
    }

    #[test]
    fn failed_response_clears_list() {
        let mut fetcher = SuggestionFetcher::new();
        let first = fetcher.on_input_changed("su", &doc_scope()).unwrap();
        fetcher.apply_response(first.seq, Ok(vec!["summary".to_string()]));
        let second = fetcher.on_input_changed("sum", &doc_scope()).unwrap();
        fetcher.apply_response(second.seq, Err("boom".to_string()));
        assert!(fetcher.candidates().is_empty());
    }

    #[test]
    fn pick_clears_list_and_invalidates_in_flight() {
        let mut fetcher = SuggestionFetcher::new();
        let request = fetcher.on_input_changed("give me a sum", &doc_scope()).unwrap();
        fetcher.apply_response(request.seq, Ok(vec!["summary".to_string()]));
        let late = fetcher.on_input_changed("give me a summ", &doc_scope()).unwrap();
        fetcher.apply_response(late.seq, Ok(vec!["summary".to_string()]));

        let picked = fetcher.pick("give me a summ", 0).unwrap();
        assert_eq!(picked, "give me a summary ");
        assert!(fetcher.candidates().is_empty());
        assert!(!fetcher.apply_response(late.seq, Ok(vec!["x".to_string()])));
        assert_eq!(fetcher.pick("give me a summ", 0), None);
    }
}
