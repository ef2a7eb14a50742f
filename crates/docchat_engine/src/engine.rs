use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use docchat_logging::{chat_debug, chat_warn};

use crate::audio::{AudioPlayer, ClipPlayer};
use crate::backend::{
    BackendSettings, ChannelProgressSink, DocumentBackend, ProgressSink, ReqwestBackend,
};
use crate::speech::{ReqwestSpeechClient, SpeechClient};
use crate::ticker::ProgressTicker;
use crate::translate::{ReqwestTranslationClient, TranslationClient};
use crate::{
    BackendError, BatchId, EngineEvent, MessageId, QueryPayload, RequestId, SpeechError,
    SuggestPayload, SuggestionSeq, UploadSource,
};

enum EngineCommand {
    FetchKnownFiles,
    Upload {
        batch_id: BatchId,
        files: Vec<UploadSource>,
    },
    ScheduleCleanup {
        batch_id: BatchId,
        delay: Duration,
    },
    Query {
        request_id: RequestId,
        payload: QueryPayload,
    },
    Suggest {
        seq: SuggestionSeq,
        payload: SuggestPayload,
    },
    Translate {
        message_id: MessageId,
        text: String,
        target_lang: String,
    },
    Speak {
        message_id: MessageId,
        text: String,
    },
}

/// The outside world the engine talks to. Tests swap in fakes.
#[derive(Clone)]
pub struct EngineServices {
    pub backend: Arc<dyn DocumentBackend>,
    pub translator: Arc<dyn TranslationClient>,
    pub speech: Arc<dyn SpeechClient>,
    pub player: Arc<dyn AudioPlayer>,
    pub ticker_interval: Duration,
    pub ticker_max_increment: u8,
}

impl EngineServices {
    pub fn reqwest(
        settings: BackendSettings,
        audio_dir: PathBuf,
        audio_player: Option<String>,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            translator: Arc::new(ReqwestTranslationClient::new(&settings)?),
            speech: Arc::new(ReqwestSpeechClient::new(&settings)?),
            player: Arc::new(ClipPlayer::new(audio_dir, audio_player)),
            ticker_interval: settings.ticker_interval,
            ticker_max_increment: settings.ticker_max_increment,
            backend: Arc::new(ReqwestBackend::new(settings)?),
        })
    }
}

/// Sends work to the engine thread. Every call returns immediately; results
/// arrive on the paired [`EngineEvents`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts the engine thread and its async runtime. The thread exits once
    /// every handle is dropped.
    pub fn start(services: EngineServices) -> io::Result<(Self, EngineEvents)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("docchat-engine-worker")
            .build()?;

        thread::Builder::new()
            .name("docchat-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let services = services.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(&services, command, event_tx).await;
                    });
                }
                chat_debug!("Engine command channel closed");
            })?;

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn fetch_known_files(&self) {
        self.send(EngineCommand::FetchKnownFiles);
    }

    pub fn upload(&self, batch_id: BatchId, files: Vec<UploadSource>) {
        self.send(EngineCommand::Upload { batch_id, files });
    }

    pub fn schedule_cleanup(&self, batch_id: BatchId, delay: Duration) {
        self.send(EngineCommand::ScheduleCleanup { batch_id, delay });
    }

    pub fn query(&self, request_id: RequestId, payload: QueryPayload) {
        self.send(EngineCommand::Query {
            request_id,
            payload,
        });
    }

    pub fn suggest(&self, seq: SuggestionSeq, payload: SuggestPayload) {
        self.send(EngineCommand::Suggest { seq, payload });
    }

    pub fn translate(
        &self,
        message_id: MessageId,
        text: impl Into<String>,
        target_lang: impl Into<String>,
    ) {
        self.send(EngineCommand::Translate {
            message_id,
            text: text.into(),
            target_lang: target_lang.into(),
        });
    }

    pub fn speak(&self, message_id: MessageId, text: impl Into<String>) {
        self.send(EngineCommand::Speak {
            message_id,
            text: text.into(),
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            chat_warn!("Engine thread is gone; command dropped");
        }
    }
}

impl EngineEvents {
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    services: &EngineServices,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::FetchKnownFiles => {
            EngineEvent::KnownFiles(services.backend.uploaded_files().await)
        }
        EngineCommand::Upload { batch_id, files } => {
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let ticker = ProgressTicker::spawn(
                batch_id,
                services.ticker_interval,
                services.ticker_max_increment,
                sink.clone(),
            );
            let result = services.backend.upload(batch_id, &files, sink).await;
            ticker.stop();
            if let Err(err) = &result {
                chat_warn!("Upload batch {} failed: {}", batch_id, err);
            }
            EngineEvent::UploadSettled { batch_id, result }
        }
        EngineCommand::ScheduleCleanup { batch_id, delay } => {
            tokio::time::sleep(delay).await;
            EngineEvent::CleanupDue { batch_id }
        }
        EngineCommand::Query {
            request_id,
            payload,
        } => {
            let result = services.backend.query(&payload).await;
            EngineEvent::QueryCompleted { request_id, result }
        }
        EngineCommand::Suggest { seq, payload } => {
            let result = services.backend.suggest(&payload).await;
            EngineEvent::Suggestions { seq, result }
        }
        EngineCommand::Translate {
            message_id,
            text,
            target_lang,
        } => {
            let result = services.translator.translate(&text, &target_lang).await;
            EngineEvent::Translated { message_id, result }
        }
        EngineCommand::Speak { message_id, text } => {
            let result = speak(services, &text).await;
            EngineEvent::SpeechFinished { message_id, result }
        }
    };
    let _ = event_tx.send(event);
}

async fn speak(services: &EngineServices, text: &str) -> Result<PathBuf, SpeechError> {
    let audio = services.speech.synthesize(text).await?;
    Ok(services.player.play(text, audio).await?)
}
