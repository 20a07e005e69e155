//! Typed HTTP client for the document search backend
//!
//! Every endpoint has a declared response shape; a response that does not
//! match its shape is reported as [`ApiError::MalformedResponse`] instead of
//! being trusted blindly. The [`SearchBackend`] trait is the seam between
//! the state machine driver and the network, so tests can substitute an
//! in-memory backend.

use crate::core::session::SessionId;
use crate::core::types::{HistoryEntry, SearchMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout for the shared client
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend API errors with typed variants
///
/// Enables callers to distinguish between different failure modes:
/// - `Network` - connection refused, timeout, DNS failure
/// - `Status` - the backend answered with a non-success status
/// - `MalformedResponse` - the body did not match the endpoint's schema
/// - `InvalidBaseUrl` - the configured base URL cannot address endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network connectivity issue (connection refused, timeout, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success HTTP status
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the endpoint's declared schema
    #[error("malformed {endpoint} response: {detail}")]
    MalformedResponse {
        endpoint: &'static str,
        detail: String,
    },

    /// The configured base URL cannot be used to address endpoints
    #[error("invalid backend URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Convert transport-level reqwest failures into typed errors
    fn from_network(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network(format!("request timeout: {}", e))
        } else if e.is_connect() {
            ApiError::Network(format!("connection failed: {}", e))
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Check whether this error is a transport failure (vs. a backend answer)
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// A file staged for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Operations the document search backend exposes
///
/// Implemented over HTTP by [`HttpBackend`]; tests implement this trait with
/// in-memory fakes to drive the state machine without a network.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// List the filenames attached to a session
    async fn list_files(&self, session: &SessionId) -> Result<Vec<String>, ApiError>;

    /// Upload files; returns the filenames the backend accepted
    async fn upload_files(
        &self,
        session: &SessionId,
        files: Vec<UploadFile>,
    ) -> Result<Vec<String>, ApiError>;

    /// Delete one file; returns the filename the backend confirms deleted,
    /// or `None` if the backend did not echo one back
    async fn delete_file(
        &self,
        session: &SessionId,
        filename: &str,
    ) -> Result<Option<String>, ApiError>;

    /// Load the persisted history for a (session, mode) pair
    async fn load_history(
        &self,
        session: &SessionId,
        mode: SearchMode,
    ) -> Result<Vec<HistoryEntry>, ApiError>;

    /// Submit a prompt; returns the completed exchange
    async fn submit_prompt(
        &self,
        session: &SessionId,
        mode: SearchMode,
        prompt: &str,
    ) -> Result<HistoryEntry, ApiError>;

    /// Persist the full history for a (session, mode) pair
    async fn save_history(
        &self,
        session: &SessionId,
        mode: SearchMode,
        entries: &[HistoryEntry],
    ) -> Result<(), ApiError>;
}

// Wire shapes, one per endpoint.

#[derive(Debug, Deserialize)]
struct FilesResponse {
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    // Absent when the backend did not delete anything.
    #[serde(default)]
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    // The history map also carries non-conversation keys (e.g. "files"),
    // so values stay raw until the mode's own key is extracted.
    #[serde(default)]
    history: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct PromptResponse {
    prompt: String,
    completion: String,
}

#[derive(Debug, Serialize)]
struct SaveChatRequest<'a> {
    chat: &'a [HistoryEntry],
}

#[derive(Debug, Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

/// HTTP implementation of [`SearchBackend`]
pub struct HttpBackend {
    http: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Create a client against a backend base URL
    ///
    /// Query and fragment are stripped; the session travels in endpoint
    /// paths, not in the query string.
    pub fn new(base: Url) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base.to_string()));
        }
        let mut base = base;
        base.set_query(None);
        base.set_fragment(None);

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { http, base })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    /// Check status and decode the body against the endpoint's schema
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &'static str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_network)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
            endpoint,
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn list_files(&self, session: &SessionId) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["files", session.as_str()])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_network)?;
        let parsed: FilesResponse = Self::decode(response, "files").await?;
        Ok(parsed.files)
    }

    async fn upload_files(
        &self,
        session: &SessionId,
        files: Vec<UploadFile>,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint(&["files", session.as_str()])?;

        let mut form = reqwest::multipart::Form::new();
        for (index, file) in files.into_iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.name);
            form = form.part(format!("file{}", index), part);
        }

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from_network)?;
        let parsed: FilesResponse = Self::decode(response, "upload").await?;
        Ok(parsed.files)
    }

    async fn delete_file(
        &self,
        session: &SessionId,
        filename: &str,
    ) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["file", session.as_str(), filename])?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(ApiError::from_network)?;
        let parsed: DeleteResponse = Self::decode(response, "delete").await?;
        Ok(parsed.file)
    }

    async fn load_history(
        &self,
        session: &SessionId,
        mode: SearchMode,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let url = self.endpoint(&["initialize", session.as_str(), mode.id()])?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_network)?;
        let parsed: InitializeResponse = Self::decode(response, "initialize").await?;

        let Some(mut history) = parsed.history else {
            return Ok(Vec::new());
        };
        match history.remove(&mode.history_key()) {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::MalformedResponse {
                    endpoint: "initialize",
                    detail: format!("history entry for {}: {}", mode.history_key(), e),
                })
            }
            None => Ok(Vec::new()),
        }
    }

    async fn submit_prompt(
        &self,
        session: &SessionId,
        mode: SearchMode,
        prompt: &str,
    ) -> Result<HistoryEntry, ApiError> {
        let url = self.endpoint(&["prompt", session.as_str(), mode.id()])?;
        let response = self
            .http
            .post(url)
            .json(&PromptRequest { prompt })
            .send()
            .await
            .map_err(ApiError::from_network)?;
        let parsed: PromptResponse = Self::decode(response, "prompt").await?;
        Ok(HistoryEntry {
            prompt: parsed.prompt,
            completion: parsed.completion,
        })
    }

    async fn save_history(
        &self,
        session: &SessionId,
        mode: SearchMode,
        entries: &[HistoryEntry],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["savechat", session.as_str(), mode.id()])?;
        let response = self
            .http
            .post(url)
            .json(&SaveChatRequest { chat: entries })
            .send()
            .await
            .map_err(ApiError::from_network)?;

        // The save body is ignored by contract; only the status matters.
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HttpBackend {
        HttpBackend::new(Url::parse("http://127.0.0.1:5000").unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let b = backend();
        let url = b.endpoint(&["files", "abc123"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/files/abc123");

        let url = b.endpoint(&["prompt", "abc123", "list"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/prompt/abc123/list");
    }

    #[test]
    fn test_endpoint_percent_encodes_filenames() {
        let b = backend();
        let url = b.endpoint(&["file", "abc123", "my report.pdf"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/file/abc123/my%20report.pdf"
        );
    }

    #[test]
    fn test_base_url_query_is_stripped() {
        let base = Url::parse("http://127.0.0.1:5000/?session=abc123").unwrap();
        let b = HttpBackend::new(base).unwrap();
        let url = b.endpoint(&["files", "abc123"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/files/abc123");
    }

    #[test]
    fn test_files_response_requires_files_field() {
        let ok: Result<FilesResponse, _> = serde_json::from_str(r#"{"files":["a.txt"]}"#);
        assert_eq!(ok.unwrap().files, vec!["a.txt"]);

        let missing: Result<FilesResponse, _> = serde_json::from_str(r#"{"session_id":"s"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_delete_response_file_is_optional() {
        let parsed: DeleteResponse = serde_json::from_str(r#"{"session_id":"s"}"#).unwrap();
        assert_eq!(parsed.file, None);

        let parsed: DeleteResponse = serde_json::from_str(r#"{"file":"report.pdf"}"#).unwrap();
        assert_eq!(parsed.file.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_initialize_response_tolerates_sibling_keys() {
        let body = r#"{
            "history": {
                "files": ["a.txt"],
                "list_chat": [{"prompt": "p", "completion": "c"}],
                "vector_chat": []
            }
        }"#;
        let parsed: InitializeResponse = serde_json::from_str(body).unwrap();
        let history = parsed.history.unwrap();

        let entries: Vec<HistoryEntry> =
            serde_json::from_value(history.get("list_chat").unwrap().clone()).unwrap();
        assert_eq!(entries, vec![HistoryEntry::new("p", "c")]);
    }

    #[test]
    fn test_prompt_response_shape() {
        let parsed: PromptResponse =
            serde_json::from_str(r#"{"prompt":"define X","completion":"X is..."}"#).unwrap();
        assert_eq!(parsed.prompt, "define X");
        assert_eq!(parsed.completion, "X is...");

        let missing: Result<PromptResponse, _> = serde_json::from_str(r#"{"prompt":"p"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_save_chat_request_wire_shape() {
        let entries = vec![HistoryEntry::new("p", "c")];
        let json = serde_json::to_string(&SaveChatRequest { chat: &entries }).unwrap();
        assert_eq!(json, r#"{"chat":[{"prompt":"p","completion":"c"}]}"#);
    }
}
