#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use bytes::Bytes;
use deep_research::db;
use deep_research::gateway::{ByteStream, GatewayError, GenerateRequest, GenerationProvider};
use deep_research::server::{build_router, AppState};
use rusqlite::Connection;
use serde_json::{json, Value};

pub const TEST_KEY: &str = "test-secret";

/// Stream chunks the stub provider sends. The euro sign is split across the
/// second and third chunk.
pub fn stream_chunks() -> Vec<Bytes> {
    let euro = "€".as_bytes();
    let mut second = b"data: {\"text\":\"cost ".to_vec();
    second.push(euro[0]);
    let mut third = euro[1..].to_vec();
    third.extend_from_slice(b"5\"}\n\n");
    vec![
        Bytes::from_static(b"data: {\"text\":\"hello\"}\n\n"),
        Bytes::from(second),
        Bytes::from(third),
    ]
}

pub fn stream_text() -> String {
    let all: Vec<u8> = stream_chunks().iter().flat_map(|c| c.to_vec()).collect();
    String::from_utf8(all).unwrap()
}

/// What a stubbed provider does when asked to generate.
#[derive(Clone, Copy)]
pub enum StubBehavior {
    Echo,
    Fail,
    Panic,
}

pub struct StubProvider {
    behavior: StubBehavior,
}

impl StubProvider {
    pub fn new(behavior: StubBehavior) -> Self {
        Self { behavior }
    }

    fn check(&self) -> Result<(), GatewayError> {
        match self.behavior {
            StubBehavior::Echo => Ok(()),
            StubBehavior::Fail => Err(GatewayError::Upstream {
                status: 503,
                body: "upstream secret detail".into(),
            }),
            StubBehavior::Panic => panic!("provider exploded"),
        }
    }
}

#[async_trait]
impl GenerationProvider for StubProvider {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, GatewayError> {
        self.check()?;
        Ok(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": format!("echo: {}", request.model) }] }
            }],
            "provider": request.provider,
        }))
    }

    async fn generate_stream(&self, _request: &GenerateRequest) -> Result<ByteStream, GatewayError> {
        self.check()?;
        let chunks = stream_chunks().into_iter().map(Ok);
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

pub fn test_app_with(conn: Connection, behavior: StubBehavior) -> Router {
    let provider: Arc<dyn GenerationProvider> = Arc::new(StubProvider::new(behavior));
    build_router(AppState::new(conn, provider, TEST_KEY))
}

pub fn test_app() -> Router {
    test_app_with(test_db(), StubBehavior::Echo)
}

/// An authenticated JSON request.
pub fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_KEY}"))
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn raw_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_KEY}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX).await.unwrap()
}

pub async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

pub fn session_body(prompt: &str) -> Value {
    json!({ "originalPrompt": prompt })
}
