use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{BackendError, FailureKind};

/// Joins a base URL and an endpoint path, keeping any path prefix on the base.
pub(crate) fn endpoint_url(base: &str, path: &str) -> Result<Url, BackendError> {
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))
}

pub(crate) fn build_client(connect_timeout: Duration) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))
}

pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: Url,
    body: &B,
    timeout: Duration,
) -> Result<R, BackendError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .timeout(timeout)
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let response = check_status(response)?;
    response.json::<R>().await.map_err(map_reqwest_error)
}

pub(crate) async fn get_json<R: DeserializeOwned>(
    client: &reqwest::Client,
    url: Url,
    timeout: Duration,
) -> Result<R, BackendError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let response = check_status(response)?;
    response.json::<R>().await.map_err(map_reqwest_error)
}

pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

pub(crate) fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Compares the media type part of a Content-Type header, ignoring parameters.
pub(crate) fn is_content_type_allowed(content_type: &str, allowed: &[String]) -> bool {
    let ct = content_type.split(';').next().unwrap_or(content_type).trim();
    allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(ct))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::Decode, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
