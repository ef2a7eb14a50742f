use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use docchat_logging::{chat_debug, chat_info};

pub type BatchId = u64;

/// Simulated progress never passes this value; only the transport may report more.
pub const SIMULATED_PROGRESS_CAP: u8 = 90;
/// How long settled items stay visible before they are purged.
pub const UPLOAD_CLEANUP_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub path: PathBuf,
}

impl UploadFile {
    /// Uses the final path component as the display name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { file_name, path }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    pub file_name: String,
    pub batch_id: BatchId,
    pub progress: u8,
    pub status: UploadStatus,
}

/// Visible upload rows keyed by file name.
///
/// Two progress sources feed each item: a simulated ticker capped at
/// [`SIMULATED_PROGRESS_CAP`] and transport events. Both go through a max
/// reducer so progress never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadTracker {
    items: Vec<UploadItem>,
    /// File count of each batch that has not settled yet.
    batch_sizes: BTreeMap<BatchId, usize>,
    next_batch_id: BatchId,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch; `None` for an empty file list.
    ///
    /// A file name already on screen is taken over by the new batch.
    pub fn start_batch(&mut self, files: &[UploadFile]) -> Option<BatchId> {
        if files.is_empty() {
            return None;
        }
        self.next_batch_id += 1;
        let batch_id = self.next_batch_id;
        for file in files {
            let fresh = UploadItem {
                file_name: file.file_name.clone(),
                batch_id,
                progress: 0,
                status: UploadStatus::Uploading,
            };
            match self
                .items
                .iter_mut()
                .find(|item| item.file_name == file.file_name)
            {
                Some(existing) => *existing = fresh,
                None => self.items.push(fresh),
            }
        }
        self.batch_sizes.insert(batch_id, files.len());
        chat_info!("Upload batch {} started with {} file(s)", batch_id, files.len());
        Some(batch_id)
    }

    /// Simulated progress: bump every uploading item of the batch, capped.
    pub fn apply_tick(&mut self, batch_id: BatchId, increment: u8) -> bool {
        let mut changed = false;
        for item in self.uploading_mut(batch_id) {
            let target = item
                .progress
                .saturating_add(increment)
                .min(SIMULATED_PROGRESS_CAP);
            if target > item.progress {
                item.progress = target;
                changed = true;
            }
        }
        changed
    }

    /// Transport progress for the whole batch.
    pub fn apply_transport_progress(&mut self, batch_id: BatchId, percent: u8) -> bool {
        let percent = percent.min(100);
        let mut changed = false;
        for item in self.uploading_mut(batch_id) {
            if percent > item.progress {
                item.progress = percent;
                changed = true;
            }
        }
        changed
    }

    /// Settles every row still owned by the batch; returns how many files the
    /// batch was started with, whether or not its rows are still visible.
    pub fn settle(&mut self, batch_id: BatchId, success: bool) -> usize {
        let mut touched = 0;
        for item in self.uploading_mut(batch_id) {
            if success {
                item.progress = 100;
                item.status = UploadStatus::Success;
            } else {
                item.status = UploadStatus::Error;
            }
            touched += 1;
        }
        let batch_size = self.batch_sizes.remove(&batch_id).unwrap_or(touched);
        chat_info!(
            "Upload batch {} settled (success={}, files={}, rows={})",
            batch_id,
            success,
            batch_size,
            touched
        );
        batch_size
    }

    /// Removes what is still owned by the batch.
    pub fn purge(&mut self, batch_id: BatchId) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.batch_id != batch_id);
        let removed = before - self.items.len();
        chat_debug!("Purged {} upload row(s) of batch {}", removed, batch_id);
        removed
    }

    pub fn dismiss(&mut self, file_name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.file_name != file_name);
        before != self.items.len()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn item(&self, file_name: &str) -> Option<&UploadItem> {
        self.items.iter().find(|item| item.file_name == file_name)
    }

    pub fn is_uploading(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == UploadStatus::Uploading)
    }

    fn uploading_mut(&mut self, batch_id: BatchId) -> impl Iterator<Item = &mut UploadItem> {
        self.items
            .iter_mut()
            .filter(move |item| item.batch_id == batch_id && item.status == UploadStatus::Uploading)
    }
}
