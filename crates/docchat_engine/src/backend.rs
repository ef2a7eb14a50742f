use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use docchat_logging::{chat_debug, chat_info};

use crate::http::{build_client, endpoint_url, get_json, map_reqwest_error, post_json};
use crate::types::{SuggestResponse, UploadedFilesResponse};
use crate::upload::build_upload_form;
use crate::{
    BackendError, BatchId, EngineEvent, QueryAnswer, QueryPayload, SuggestPayload, UploadSource,
};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub speech_url: String,
    pub upload_path: String,
    pub uploaded_files_path: String,
    pub query_path: String,
    pub suggest_path: String,
    pub translate_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub audio_content_types: Vec<String>,
    pub ticker_interval: Duration,
    pub ticker_max_increment: u8,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            speech_url: "http://127.0.0.1:3000/api/tts".to_string(),
            upload_path: "/upload".to_string(),
            uploaded_files_path: "/uploaded_files".to_string(),
            query_path: "/query".to_string(),
            suggest_path: "/suggest_words".to_string(),
            translate_path: "/translate".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(600),
            audio_content_types: vec!["audio/mpeg".to_string()],
            ticker_interval: Duration::from_millis(500),
            ticker_max_increment: 20,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

#[derive(Clone)]
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The retrieval/question-answering backend.
#[async_trait::async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Sends the batch as one multipart request, reporting byte progress to `sink`.
    async fn upload(
        &self,
        batch_id: BatchId,
        files: &[UploadSource],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<(), BackendError>;

    async fn uploaded_files(&self) -> Result<Vec<String>, BackendError>;

    async fn query(&self, payload: &QueryPayload) -> Result<QueryAnswer, BackendError>;

    async fn suggest(&self, payload: &SuggestPayload) -> Result<Vec<String>, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = build_client(settings.connect_timeout)?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl DocumentBackend for ReqwestBackend {
    async fn upload(
        &self,
        batch_id: BatchId,
        files: &[UploadSource],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<(), BackendError> {
        let url = endpoint_url(&self.settings.base_url, &self.settings.upload_path)?;
        let form = build_upload_form(batch_id, files, sink).await?;
        chat_info!("Uploading batch {} ({} file(s)) to {}", batch_id, files.len(), url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .timeout(self.settings.upload_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        crate::http::check_status(response)?;
        Ok(())
    }

    async fn uploaded_files(&self) -> Result<Vec<String>, BackendError> {
        let url = endpoint_url(&self.settings.base_url, &self.settings.uploaded_files_path)?;
        let response: UploadedFilesResponse =
            get_json(&self.client, url, self.settings.request_timeout).await?;
        chat_debug!("Backend reports {} uploaded file(s)", response.uploaded_files.len());
        Ok(response.uploaded_files)
    }

    async fn query(&self, payload: &QueryPayload) -> Result<QueryAnswer, BackendError> {
        let url = endpoint_url(&self.settings.base_url, &self.settings.query_path)?;
        post_json(&self.client, url, payload, self.settings.request_timeout).await
    }

    async fn suggest(&self, payload: &SuggestPayload) -> Result<Vec<String>, BackendError> {
        let url = endpoint_url(&self.settings.base_url, &self.settings.suggest_path)?;
        let response: SuggestResponse =
            post_json(&self.client, url, payload, self.settings.request_timeout).await?;
        Ok(response.suggestions)
    }
}
