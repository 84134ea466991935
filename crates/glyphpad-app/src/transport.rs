//! HTTP transport abstraction.
//!
//! The transport moves bytes and reports status codes; interpreting them
//! (auth expiry, scoring results) is the caller's job.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// HTTP method used for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Put,
    Post,
}

/// A single file sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Form field name.
    pub field: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// An upload to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub method: HttpMethod,
    /// Path relative to the API base URL.
    pub path: String,
    /// Bearer token, attached as `Authorization: Bearer <token>` when present.
    pub bearer: Option<String>,
    pub form: UploadForm,
}

/// Raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP backends.
pub trait Transport: Send + Sync {
    /// Send a multipart upload.
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, TransportResult<TransportResponse>>;

    /// Issue a `GET` for `path`.
    fn get(&self, path: &str, bearer: Option<String>) -> BoxFuture<'_, TransportResult<TransportResponse>>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and a relative path.
    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> TransportResult<TransportResponse> {
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn upload(&self, request: UploadRequest) -> BoxFuture<'_, TransportResult<TransportResponse>> {
        Box::pin(async move {
            let UploadRequest {
                method,
                path,
                bearer,
                form,
            } = request;

            let part = reqwest::multipart::Part::bytes(form.bytes)
                .file_name(form.filename)
                .mime_str(&form.mime_type)?;
            let multipart = reqwest::multipart::Form::new().part(form.field, part);

            let url = self.url(&path);
            let mut builder = match method {
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Post => self.client.post(&url),
            };
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }

            log::debug!("{method:?} {url}");
            let response = builder.multipart(multipart).send().await?;
            Self::read(response).await
        })
    }

    fn get(&self, path: &str, bearer: Option<String>) -> BoxFuture<'_, TransportResult<TransportResponse>> {
        let url = self.url(path);
        Box::pin(async move {
            let mut builder = self.client.get(&url);
            if let Some(token) = bearer {
                builder = builder.bearer_auth(token);
            }

            log::debug!("GET {url}");
            let response = builder.send().await?;
            Self::read(response).await
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://host/api", "/progress"), "http://host/api/progress");
        assert_eq!(join_url("http://host/api/", "progress/current"), "http://host/api/progress/current");
    }

    #[test]
    fn test_response_success_range() {
        let ok = TransportResponse { status: 204, body: Vec::new() };
        let denied = TransportResponse { status: 401, body: Vec::new() };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }

    #[test]
    fn test_http_transport_keeps_base_url() {
        let transport = HttpTransport::new("http://127.0.0.1:5001/api", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:5001/api");
        assert_eq!(transport.url("/progress"), "http://127.0.0.1:5001/api/progress");
    }

    #[test]
    fn test_method_serde() {
        let method: HttpMethod = serde_json::from_str("\"post\"").unwrap();
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(HttpMethod::default(), HttpMethod::Put);
    }
}
