//! Generation through the worker, shaped like the provider SDK: one-shot
//! generation, streamed chunks carrying both the text and a candidate, and
//! the selectable model list.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ApiClient, ClientError};
use crate::gateway::{Content, GenerateRequest, Part};
use crate::stores::settings::{Settings, DEFAULT_MODEL_LIST};

/// One streamed piece of a generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateChunk {
    pub text: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateChunk {
    fn from_text(text: String) -> Self {
        let content = Content {
            role: None,
            parts: vec![Part::text(text.as_str())],
            extra: Map::new(),
        };
        Self {
            text,
            candidates: vec![Candidate { content }],
        }
    }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateChunk, ClientError>> + Send>>;

pub struct WorkerProvider {
    client: ApiClient,
    models: Vec<String>,
}

impl WorkerProvider {
    /// Offers the default model list.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            models: DEFAULT_MODEL_LIST.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Offers the models listed in the user's settings.
    pub fn from_settings(client: ApiClient, settings: &Settings) -> Self {
        Self {
            client,
            models: settings.model_list.clone(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<Value, ClientError> {
        self.client.generate_content(request).await
    }

    /// Streamed generation. Each chunk is whatever text arrived in one read,
    /// not a parsed provider event.
    pub async fn generate_stream(&self, request: &GenerateRequest) -> Result<ChunkStream, ClientError> {
        let text = self.client.generate_content_stream(request).await?;
        Ok(Box::pin(text.map(|chunk| chunk.map(GenerateChunk::from_text))))
    }

    /// Model resource names, e.g. `models/gemini-2.5-pro`.
    pub fn list_models(&self) -> Vec<String> {
        self.models.iter().map(|m| format!("models/{m}")).collect()
    }
}

/// Concatenated text parts of the first candidate, skipping thoughts.
pub fn response_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter(|p| p["thought"].as_bool() != Some(true))
        .filter_map(|p| p["text"].as_str())
        .collect();
    Some(text)
}
