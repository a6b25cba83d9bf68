use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;
use crate::types::{
    MessageHistory, ModelCatalog, SendReply, SendRequest, SessionList, UploadKind, UploadReceipt,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-request limits applied by the HTTP implementation. A backend request
/// can never outlive `timeout`, so a caller waiting on one cannot hang
/// indefinitely.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    pub timeout: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// The backend contract: one method per exchange the client performs.
/// Implementations must be swappable so the synchronization core can be
/// exercised against fakes.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_models(&self) -> Result<ModelCatalog, ApiError>;

    async fn list_sessions(&self) -> Result<SessionList, ApiError>;

    async fn load_messages(&self, session_id: &str) -> Result<MessageHistory, ApiError>;

    async fn send_message(&self, request: &SendRequest) -> Result<SendReply, ApiError>;

    async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ApiError>;
}

/// `ChatBackend` over a real HTTP service.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    policy: RequestPolicy,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            policy: RequestPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RequestPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Run a prepared request and decode the JSON body. Non-2xx responses
    /// become `ApiError::Status` carrying the body text (or the canonical
    /// status reason when the body is empty); a 2xx response whose declared
    /// content type is not JSON is a decode failure.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.timeout(self.policy.timeout).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let body = if body.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if !content_type.contains("application/json") {
            return Err(ApiError::Decode(format!(
                "expected a JSON body, got content type `{}`",
                content_type
            )));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_models(&self) -> Result<ModelCatalog, ApiError> {
        debug!("fetching model catalog");
        self.execute(self.client.get(self.endpoint("/models"))).await
    }

    async fn list_sessions(&self) -> Result<SessionList, ApiError> {
        debug!("fetching session list");
        self.execute(self.client.get(self.endpoint("/chat/sessions")))
            .await
    }

    async fn load_messages(&self, session_id: &str) -> Result<MessageHistory, ApiError> {
        debug!(session_id, "fetching message history");
        let path = format!("/chat/{}/messages", urlencoding::encode(session_id));
        self.execute(self.client.get(self.endpoint(&path))).await
    }

    async fn send_message(&self, request: &SendRequest) -> Result<SendReply, ApiError> {
        debug!(session_id = ?request.session_id, "posting message");
        self.execute(self.client.post(self.endpoint("/chat")).json(request))
            .await
    }

    async fn upload(
        &self,
        kind: UploadKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReceipt, ApiError> {
        debug!(filename, field = kind.field_name(), "uploading attachment");
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part(kind.field_name(), part);
        self.execute(self.client.post(self.endpoint(kind.path())).multipart(form))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(
            backend.endpoint("/chat/sessions"),
            "http://localhost:8000/chat/sessions"
        );
        assert_eq!(backend.endpoint("models"), "http://localhost:8000/models");
    }

    #[test]
    fn session_ids_are_escaped_in_paths() {
        assert_eq!(urlencoding::encode("a b/c"), "a%20b%2Fc");
    }
}
