//! AI gateway provider.
//!
//! Requests go to `{base_url}/{account_id}/{gateway_id}/{provider}` followed by
//! the provider's own model path, authenticated with the gateway token.

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use serde_json::Value;

use super::{ByteStream, GatewayError, GenerateRequest, GenerationProvider};
use crate::config::GatewayConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct AiGateway {
    client: Client,
    base_url: String,
    account_id: String,
    gateway_id: String,
    token: String,
    default_provider: String,
}

impl AiGateway {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;

        if config.account_id.is_empty() {
            tracing::warn!("gateway account id is not configured; generation requests will fail");
        }
        if config.token.is_empty() {
            tracing::warn!("gateway token is not configured; generation requests will fail");
        }

        tracing::info!(
            base = %config.base_url,
            gateway = %config.gateway_id,
            "AI gateway provider ready"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            gateway_id: config.gateway_id.clone(),
            token: config.token.clone(),
            default_provider: config.default_provider.clone(),
        })
    }

    /// Gateway URL for a provider, e.g.
    /// `https://gateway.ai.cloudflare.com/v1/<account>/research/google-ai-studio`.
    pub fn provider_url(&self, provider: &str) -> Result<String, GatewayError> {
        let valid = !provider.is_empty()
            && provider
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(GatewayError::InvalidConfig(format!("unknown provider: {provider}")));
        }
        Ok(format!(
            "{}/{}/{}/{}",
            self.base_url, self.account_id, self.gateway_id, provider
        ))
    }

    /// Full model endpoint for a request.
    pub fn endpoint(&self, request: &GenerateRequest, stream: bool) -> Result<String, GatewayError> {
        let provider = request.provider.as_deref().unwrap_or(&self.default_provider);
        let base = self.provider_url(provider)?;
        let url = if stream {
            format!("{base}/v1beta/models/{}:streamGenerateContent?alt=sse", request.model)
        } else {
            format!("{base}/v1beta/models/{}:generateContent", request.model)
        };
        Ok(url)
    }

    async fn send(&self, request: &GenerateRequest, stream: bool) -> Result<reqwest::Response, GatewayError> {
        request.validate()?;
        let url = self.endpoint(request, stream)?;

        tracing::debug!(
            provider = %request.provider.as_deref().unwrap_or(&self.default_provider),
            model = %request.model,
            stream,
            "forwarding generation request"
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.token)
            .json(&request.wire_body())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationProvider for AiGateway {
    async fn generate(&self, request: &GenerateRequest) -> Result<Value, GatewayError> {
        let response = self.send(request, false).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn generate_stream(&self, request: &GenerateRequest) -> Result<ByteStream, GatewayError> {
        let response = self.send(request, true).await?;
        Ok(Box::pin(response.bytes_stream().map_err(GatewayError::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> AiGateway {
        AiGateway::new(&GatewayConfig {
            base_url: "https://gateway.example.com/v1/".into(),
            account_id: "acct".into(),
            gateway_id: "research".into(),
            token: "gw".into(),
            default_provider: "google-ai-studio".into(),
        })
        .unwrap()
    }

    #[test]
    fn provider_url_joins_segments() {
        assert_eq!(
            gateway().provider_url("google-ai-studio").unwrap(),
            "https://gateway.example.com/v1/acct/research/google-ai-studio"
        );
    }

    #[test]
    fn provider_url_rejects_path_tricks() {
        assert!(gateway().provider_url("../admin").is_err());
        assert!(gateway().provider_url("").is_err());
    }

    #[test]
    fn explicit_provider_overrides_default() {
        let mut req = GenerateRequest::from_prompt("gemini-2.5-flash", "hi");
        req.provider = Some("openai".into());
        assert!(gateway()
            .endpoint(&req, false)
            .unwrap()
            .starts_with("https://gateway.example.com/v1/acct/research/openai/"));
    }

    #[test]
    fn endpoint_switches_method_for_streaming() {
        let req = GenerateRequest::from_prompt("gemini-2.5-flash", "hi");
        let gw = gateway();
        assert!(gw
            .endpoint(&req, false)
            .unwrap()
            .ends_with("/v1beta/models/gemini-2.5-flash:generateContent"));
        assert!(gw
            .endpoint(&req, true)
            .unwrap()
            .ends_with("/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"));
    }
}
