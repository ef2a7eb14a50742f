use thiserror::Error;

/// Signed-in user as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Loading,
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    /// Caller identity sent along with queries, if known.
    pub fn identity(&self) -> Option<&str> {
        match self {
            AuthState::SignedIn(session) => session.email.as_deref(),
            AuthState::Loading | AuthState::SignedOut => None,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        match self {
            AuthState::SignedIn(session) => session
                .name
                .as_deref()
                .or(session.email.as_deref()),
            AuthState::Loading | AuthState::SignedOut => None,
        }
    }
}

/// Which documents a query or suggestion is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FileScope {
    #[default]
    AllFiles,
    Document(String),
}

impl FileScope {
    pub fn document(&self) -> Option<&str> {
        match self {
            FileScope::AllFiles => None,
            FileScope::Document(name) => Some(name),
        }
    }
}

/// Document names the backend currently has indexed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnownFiles {
    files: Vec<String>,
}

impl KnownFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the set, dropping blanks and duplicates while keeping backend order.
    pub fn replace(&mut self, files: Vec<String>) {
        let mut unique: Vec<String> = Vec::with_capacity(files.len());
        for file in files {
            let file = file.trim().to_string();
            if !file.is_empty() && !unique.contains(&file) {
                unique.push(file);
            }
        }
        self.files = unique;
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Accepts `AllFiles` always and a document only when it is indexed.
    pub fn validate(&self, scope: &FileScope) -> Result<(), SelectionRejection> {
        match scope {
            FileScope::AllFiles => Ok(()),
            FileScope::Document(name) if self.contains(name) => Ok(()),
            FileScope::Document(name) => Err(SelectionRejection::UnknownDocument(name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionRejection {
    #[error("{0} is not among the uploaded files")]
    UnknownDocument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_files_dedupe_and_keep_order() {
        let mut known = KnownFiles::new();
        known.replace(vec![
            "b.pdf".to_string(),
            " a.pdf ".to_string(),
            "b.pdf".to_string(),
            "".to_string(),
        ]);
        assert_eq!(known.as_slice(), &["b.pdf".to_string(), "a.pdf".to_string()]);
        assert!(known.contains("a.pdf"));
    }

    #[test]
    fn scope_validation_needs_an_indexed_document() {
        let mut known = KnownFiles::new();
        known.replace(vec!["a.pdf".to_string()]);
        assert_eq!(known.validate(&FileScope::AllFiles), Ok(()));
        assert_eq!(known.validate(&FileScope::Document("a.pdf".to_string())), Ok(()));
        assert_eq!(
            known.validate(&FileScope::Document("z.pdf".to_string())),
            Err(SelectionRejection::UnknownDocument("z.pdf".to_string()))
        );
    }

    #[test]
    fn identity_only_when_signed_in() {
        let session = Session {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            avatar_url: None,
        };
        assert_eq!(AuthState::Loading.identity(), None);
        assert_eq!(AuthState::SignedOut.identity(), None);
        let signed_in = AuthState::SignedIn(session);
        assert_eq!(signed_in.identity(), Some("ada@example.com"));
        assert_eq!(signed_in.display_name(), Some("Ada"));
    }
}
