use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::{BatchId, EngineEvent, ProgressSink};

/// Emits simulated progress for one upload batch until stopped or dropped.
///
/// The receiving side caps simulated progress, so the ticker itself runs
/// unbounded and only decides the size of each step.
pub struct ProgressTicker {
    token: CancellationToken,
}

impl ProgressTicker {
    pub fn spawn(
        batch_id: BatchId,
        interval: Duration,
        max_increment: u8,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            // The first tick of an interval completes immediately.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticks.tick() => {
                        let increment = next_increment(max_increment);
                        sink.emit(EngineEvent::UploadTick { batch_id, increment });
                    }
                }
            }
        });
        Self { token }
    }

    pub fn stop(self) {
        self.token.cancel();
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn next_increment(max_increment: u8) -> u8 {
    rand::thread_rng().gen_range(1..=max_increment.max(1))
}
