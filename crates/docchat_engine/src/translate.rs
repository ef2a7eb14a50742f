use std::time::Duration;

use crate::http::{build_client, endpoint_url, post_json};
use crate::types::{TranslatePayload, TranslateResponse};
use crate::{BackendError, BackendSettings};

/// Turns text into its translation; one fresh request per call.
#[async_trait::async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTranslationClient {
    client: reqwest::Client,
    base_url: String,
    path: String,
    timeout: Duration,
}

impl ReqwestTranslationClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(settings.connect_timeout)?,
            base_url: settings.base_url.clone(),
            path: settings.translate_path.clone(),
            timeout: settings.request_timeout,
        })
    }
}

#[async_trait::async_trait]
impl TranslationClient for ReqwestTranslationClient {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, BackendError> {
        let url = endpoint_url(&self.base_url, &self.path)?;
        let payload = TranslatePayload { text, target_lang };
        let response: TranslateResponse =
            post_json(&self.client, url, &payload, self.timeout).await?;
        Ok(response.translated_text)
    }
}
