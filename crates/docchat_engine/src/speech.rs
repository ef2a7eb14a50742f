use std::time::Duration;

use bytes::Bytes;
use docchat_logging::chat_debug;
use url::Url;

use crate::http::{
    build_client, check_status, content_type, is_content_type_allowed, map_reqwest_error,
};
use crate::types::SpeechPayload;
use crate::{BackendError, BackendSettings, FailureKind};

/// Converts text to audio bytes; one fresh request per call.
#[async_trait::async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Bytes, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSpeechClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    allowed_content_types: Vec<String>,
}

impl ReqwestSpeechClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(settings.connect_timeout)?,
            url: settings.speech_url.clone(),
            timeout: settings.request_timeout,
            allowed_content_types: settings.audio_content_types.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SpeechClient for ReqwestSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Bytes, BackendError> {
        let url = Url::parse(&self.url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self
            .client
            .post(url)
            .json(&SpeechPayload { text })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        // A missing content type is as unacceptable as a wrong one.
        let ct = content_type(&response).unwrap_or_default();
        if !is_content_type_allowed(&ct, &self.allowed_content_types) {
            return Err(BackendError::new(
                FailureKind::UnsupportedContentType { content_type: ct },
                "speech endpoint did not return audio",
            ));
        }

        let audio = response.bytes().await.map_err(map_reqwest_error)?;
        chat_debug!("Synthesized {} byte(s) of audio", audio.len());
        Ok(audio)
    }
}
