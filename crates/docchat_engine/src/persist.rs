use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use docchat_logging::chat_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create clip directory {dir:?}: {source}")]
    CreateDir { dir: PathBuf, source: io::Error },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates the clip directory on first use.
pub(crate) fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
                dir: dir.to_path_buf(),
                source,
            })
        }
        Err(err) => Err(PersistError::Io(err)),
    }
}

/// Directory of synthesized clips. Clip names are derived from the spoken
/// text, so an identical clip already on disk is reused as is.
pub(crate) struct ClipStore {
    dir: PathBuf,
}

impl ClipStore {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Stores `audio` as `{dir}/{filename}`. A player never sees a partial
    /// clip: bytes go to a temp file that is renamed over the target.
    pub(crate) fn store(&self, filename: &str, audio: &[u8]) -> Result<PathBuf, PersistError> {
        prepare_dir(&self.dir)?;

        let target = self.dir.join(filename);
        if fs::read(&target).is_ok_and(|existing| existing == audio) {
            chat_debug!("Reusing stored clip {:?}", target);
            return Ok(target);
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(audio)?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_creates_directory_and_replaces_changed_clip() {
        let root = tempfile::tempdir().unwrap();
        let store = ClipStore::new(root.path().join("audio"));

        let path = store.store("hello--abcd.mp3", b"first").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        let again = store.store("hello--abcd.mp3", b"second").unwrap();
        assert_eq!(again, path);
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn identical_clip_is_reused() {
        let root = tempfile::tempdir().unwrap();
        let store = ClipStore::new(root.path().to_path_buf());
        let path = store.store("clip.mp3", b"same").unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        assert_eq!(store.store("clip.mp3", b"same").unwrap(), path);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn file_in_place_of_directory_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("audio");
        fs::write(&blocker, b"not a dir").unwrap();

        let err = ClipStore::new(blocker).store("clip.mp3", b"x").unwrap_err();
        assert!(matches!(err, PersistError::NotADirectory(_)));
    }
}
