use std::path::{Path, PathBuf};

use bytes::Bytes;
use docchat_logging::{chat_debug, chat_info};
use thiserror::Error;
use tokio::process::Command;

use crate::filename::clip_filename;
use crate::persist::{ClipStore, PersistError};

const CLIP_EXTENSION: &str = "mp3";

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("cannot store audio clip: {0}")]
    Persist(#[from] PersistError),
    #[error("audio player `{command}` failed: {message}")]
    Player { command: String, message: String },
}

/// Plays synthesized audio for a piece of text and reports where the clip lives.
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, text: &str, audio: Bytes) -> Result<PathBuf, AudioError>;
}

/// Stores each clip under a directory and optionally hands it to an external
/// player command (e.g. `mpg123 -q`), which receives the clip path as its last argument.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    dir: PathBuf,
    command: Option<String>,
}

impl ClipPlayer {
    pub fn new(dir: PathBuf, command: Option<String>) -> Self {
        let command = command.filter(|c| !c.trim().is_empty());
        Self { dir, command }
    }

    async fn run_player(&self, command: &str, clip: &Path) -> Result<(), AudioError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or_else(|| AudioError::Player {
            command: command.to_string(),
            message: "empty command".to_string(),
        })?;
        let status = Command::new(program)
            .args(parts)
            .arg(clip)
            .status()
            .await
            .map_err(|err| AudioError::Player {
                command: command.to_string(),
                message: err.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(AudioError::Player {
                command: command.to_string(),
                message: status.to_string(),
            })
        }
    }
}

#[async_trait::async_trait]
impl AudioPlayer for ClipPlayer {
    async fn play(&self, text: &str, audio: Bytes) -> Result<PathBuf, AudioError> {
        let filename = clip_filename(text, CLIP_EXTENSION);
        let store = ClipStore::new(self.dir.clone());
        let clip = tokio::task::spawn_blocking(move || store.store(&filename, &audio))
            .await
            .map_err(|err| PersistError::Io(std::io::Error::other(err.to_string())))??;
        chat_debug!("Stored audio clip at {}", clip.display());

        if let Some(command) = &self.command {
            chat_info!("Playing {} with `{}`", clip.display(), command);
            self.run_player(command, &clip).await?;
        }
        Ok(clip)
    }
}
