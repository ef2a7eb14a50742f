use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docchat_core::{AuthState, CoreSettings, Session, DEFAULT_TARGET_LANG};
use docchat_engine::BackendSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "docchat.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub speech_url: String,
    pub uploaded_files_path: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub default_target_lang: String,
    pub auto_translate: Option<String>,
    pub audio_dir: PathBuf,
    pub audio_player: Option<String>,
    pub log_file: PathBuf,
    pub session: Option<SessionConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            backend_url: backend.base_url,
            speech_url: backend.speech_url,
            uploaded_files_path: backend.uploaded_files_path,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            upload_timeout_secs: backend.upload_timeout.as_secs(),
            default_target_lang: DEFAULT_TARGET_LANG.to_string(),
            auto_translate: None,
            audio_dir: PathBuf::from("./audio"),
            audio_player: None,
            log_file: PathBuf::from("./docchat.log"),
            session: None,
        }
    }
}

impl AppConfig {
    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            speech_url: self.speech_url.clone(),
            uploaded_files_path: self.uploaded_files_path.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
            ..BackendSettings::default()
        }
    }

    pub fn core_settings(&self) -> CoreSettings {
        CoreSettings {
            default_target_lang: self.default_target_lang.clone(),
            auto_translate: self.auto_translate.clone(),
        }
    }

    /// Command-line identity wins over the config file, field by field.
    pub fn override_session(&mut self, name: Option<String>, email: Option<String>) {
        if name.is_none() && email.is_none() {
            return;
        }
        let session = self.session.get_or_insert_with(SessionConfig::default);
        if name.is_some() {
            session.name = name;
        }
        if email.is_some() {
            session.email = email;
        }
    }

    /// A session block with neither name nor email counts as signed out.
    pub fn auth_state(&self) -> AuthState {
        match &self.session {
            Some(session) if session.email.is_some() || session.name.is_some() => {
                AuthState::SignedIn(Session {
                    name: session.name.clone(),
                    email: session.email.clone(),
                    avatar_url: session.avatar_url.clone(),
                })
            }
            _ => AuthState::SignedOut,
        }
    }
}

/// Reads the config file. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
