//! Typed client for the research worker.
//!
//! [`ApiClient`] attaches the bearer credential to every request and maps each
//! worker route onto one method. A non-2xx response becomes
//! [`ClientError::Api`] carrying the status and body text. Nothing is retried.

pub mod provider;
pub mod stream;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::gateway::GenerateRequest;
use crate::research::types::{
    NewResearchLog, NewResearchSession, NewResearchTask, ResearchLog, ResearchSession,
    ResearchTask, SessionDetail, SessionUpdate,
};
pub use provider::{ChunkStream, GenerateChunk, WorkerProvider};
pub use stream::{decode_text_stream, TextStream};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API Error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of a worker rejection, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send, fail on a non-2xx status, and hand back the response.
    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "worker rejected request");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + ?Sized)>,
    ) -> Result<T, ClientError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Non-streaming generation. Returns the provider response as-is.
    pub async fn generate_content(&self, request: &GenerateRequest) -> Result<Value, ClientError> {
        let mut request = request.clone();
        request.stream = false;
        self.call(Method::POST, "/api/ai/generate", Some(&request)).await
    }

    /// Streaming generation. The returned stream yields decoded text as the
    /// worker sends it and ends when the connection closes.
    pub async fn generate_content_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<TextStream, ClientError> {
        let mut request = request.clone();
        request.stream = true;
        let builder = self
            .request(Method::POST, "/api/ai/generate")
            .body(serde_json::to_vec(&request)?);
        let response = self.send(builder).await?;
        Ok(decode_text_stream(response.bytes_stream()))
    }

    pub async fn create_session(
        &self,
        session: &NewResearchSession,
    ) -> Result<ResearchSession, ClientError> {
        self.call(Method::POST, "/api/research/sessions", Some(session)).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<ResearchSession>, ClientError> {
        self.call(Method::GET, "/api/research/sessions", None::<&()>).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<SessionDetail, ClientError> {
        let path = format!("/api/research/sessions/{session_id}");
        self.call(Method::GET, &path, None::<&()>).await
    }

    pub async fn update_session(
        &self,
        session_id: &str,
        update: &SessionUpdate,
    ) -> Result<ResearchSession, ClientError> {
        let path = format!("/api/research/sessions/{session_id}");
        self.call(Method::PATCH, &path, Some(update)).await
    }

    pub async fn create_task(&self, task: &NewResearchTask) -> Result<ResearchTask, ClientError> {
        self.call(Method::POST, "/api/research/tasks", Some(task)).await
    }

    pub async fn create_log(&self, log: &NewResearchLog) -> Result<ResearchLog, ClientError> {
        self.call(Method::POST, "/api/research/logs", Some(log)).await
    }
}
