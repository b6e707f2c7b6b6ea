//! Generation provider seam.
//!
//! The worker forwards generation requests through a [`GenerationProvider`].
//! [`ai_gateway::AiGateway`] is the production implementation; tests plug in
//! their own. The provider is created via [`create_provider`] from configuration.

pub mod ai_gateway;
pub mod types;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

pub use types::{
    Content, GenerateRequest, GenerationConfig, Part, SystemInstruction, ThinkingConfig, Tool,
};

/// Provider used when a request names none.
pub const DEFAULT_PROVIDER: &str = "google-ai-studio";

/// Raw upstream body chunks, forwarded to the caller as they arrive.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, GatewayError>> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid generation request: {0}")]
    InvalidConfig(String),
}

/// Something that can answer generation requests.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run a generation and return the provider's response JSON untouched.
    async fn generate(&self, request: &GenerateRequest) -> Result<serde_json::Value, GatewayError>;

    /// Run a streaming generation and return the provider's body as it arrives.
    async fn generate_stream(&self, request: &GenerateRequest) -> Result<ByteStream, GatewayError>;
}

/// Create the generation provider from config.
pub fn create_provider(
    config: &crate::config::GatewayConfig,
) -> anyhow::Result<Box<dyn GenerationProvider>> {
    let gateway = ai_gateway::AiGateway::new(config)?;
    Ok(Box::new(gateway))
}
