use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;

use crate::{BackendError, BatchId, EngineEvent, FailureKind, ProgressSink, UploadSource};

const CHUNK_SIZE: usize = 64 * 1024;

/// Shared byte counter for one batch; emits a progress event whenever the
/// whole-batch percentage grows.
struct BatchProgress {
    batch_id: BatchId,
    total: u64,
    sent: AtomicU64,
    last_percent: AtomicU8,
    sink: Arc<dyn ProgressSink>,
}

impl BatchProgress {
    fn record(&self, bytes: usize) {
        if self.total == 0 {
            return;
        }
        let sent = self.sent.fetch_add(bytes as u64, Ordering::Relaxed) + bytes as u64;
        let percent = ((sent.min(self.total) * 100) / self.total) as u8;
        let previous = self.last_percent.fetch_max(percent, Ordering::Relaxed);
        if percent > previous {
            self.sink.emit(EngineEvent::UploadProgress {
                batch_id: self.batch_id,
                percent,
            });
        }
    }
}

/// Reads the batch and builds a multipart form whose parts report progress as
/// the transport pulls their bytes.
pub(crate) async fn build_upload_form(
    batch_id: BatchId,
    files: &[UploadSource],
    sink: Arc<dyn ProgressSink>,
) -> Result<Form, BackendError> {
    let mut contents = Vec::with_capacity(files.len());
    for file in files {
        let bytes = tokio::fs::read(&file.path).await.map_err(|err| {
            BackendError::new(
                FailureKind::Io,
                format!("cannot read {}: {err}", file.path.display()),
            )
        })?;
        contents.push((file.file_name.clone(), Bytes::from(bytes)));
    }

    let total = contents.iter().map(|(_, bytes)| bytes.len() as u64).sum();
    let progress = Arc::new(BatchProgress {
        batch_id,
        total,
        sent: AtomicU64::new(0),
        last_percent: AtomicU8::new(0),
        sink,
    });

    let mut form = Form::new();
    for (file_name, bytes) in contents {
        let length = bytes.len() as u64;
        let chunks = split_chunks(bytes);
        let progress = progress.clone();
        let body = Body::wrap_stream(stream::iter(chunks.into_iter().map(move |chunk| {
            progress.record(chunk.len());
            Ok::<Bytes, std::io::Error>(chunk)
        })));
        form = form.part("files", Part::stream_with_length(body, length).file_name(file_name));
    }
    Ok(form)
}

fn split_chunks(bytes: Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len() / CHUNK_SIZE + 1);
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + CHUNK_SIZE).min(bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<EngineEvent>>,
    }

    impl ProgressSink for Recorder {
        fn emit(&self, event: EngineEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn chunks_cover_all_bytes() {
        let bytes = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 10]);
        let chunks = split_chunks(bytes);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 10);
        assert!(split_chunks(Bytes::new()).is_empty());
    }

    #[test]
    fn progress_is_reported_once_per_percent() {
        let recorder = Arc::new(Recorder::default());
        let progress = BatchProgress {
            batch_id: 4,
            total: 200,
            sent: AtomicU64::new(0),
            last_percent: AtomicU8::new(0),
            sink: recorder.clone(),
        };
        progress.record(100);
        progress.record(1);
        progress.record(99);

        let percents: Vec<u8> = recorder
            .events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::UploadProgress { batch_id: 4, percent } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![50, 100]);
    }
}
