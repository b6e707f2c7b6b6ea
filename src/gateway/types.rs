//! Typed generation request and the recognized generation options.
//!
//! [`GenerationConfig`] rejects unknown keys and out-of-range values so that
//! nothing unvalidated is forwarded upstream. [`GenerateRequest::wire_body`]
//! renders the provider's request shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::GatewayError;

/// Body of `POST /api/ai/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub model: String,
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<GenerationConfig>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

impl GenerateRequest {
    /// A single-turn user prompt.
    pub fn from_prompt(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            provider: None,
            model: model.into(),
            contents: vec![Content::user(prompt)],
            config: None,
            stream: false,
        }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::InvalidConfig("model must not be empty".into()));
        }
        if self.model.contains('/') || self.model.contains(':') {
            return Err(GatewayError::InvalidConfig(format!(
                "invalid model identifier: {}",
                self.model
            )));
        }
        if self.contents.is_empty() {
            return Err(GatewayError::InvalidConfig("contents must not be empty".into()));
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }
        Ok(())
    }

    /// Request body in the provider's wire format: `contents` plus
    /// `systemInstruction`, `tools` and `generationConfig` lifted out of the
    /// config.
    pub fn wire_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("contents".into(), json!(self.contents));

        if let Some(config) = &self.config {
            if let Some(system) = &config.system_instruction {
                body.insert("systemInstruction".into(), system.to_content());
            }
            if !config.tools.is_empty() {
                body.insert("tools".into(), json!(config.tools));
            }
            let generation = config.generation_config();
            if !generation.is_empty() {
                body.insert("generationConfig".into(), Value::Object(generation));
            }
        }

        Value::Object(body)
    }
}

/// One conversation turn.
///
/// Fields the worker does not interpret are kept in `extra` and forwarded
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part::text(text)],
            extra: Map::new(),
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
            extra: Map::new(),
        }
    }
}

/// One piece of a turn. Function calls and responses, code execution
/// results, thought signatures and the like travel in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Base64 payload embedded in a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Reference to a previously uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub file_uri: String,
}

/// Generation options accepted by the worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// JSON schema for structured output; passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
}

/// `systemInstruction` as a plain string, a content object or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemInstruction {
    Text(String),
    Content(Content),
    Parts(Vec<Part>),
}

impl SystemInstruction {
    /// The instruction in content form, as the provider expects it.
    fn to_content(&self) -> Value {
        match self {
            SystemInstruction::Text(text) => json!(Content::system(text)),
            SystemInstruction::Content(content) => json!(content),
            SystemInstruction::Parts(parts) => json!({ "parts": parts }),
        }
    }
}

impl From<&str> for SystemInstruction {
    fn from(text: &str) -> Self {
        SystemInstruction::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThinkingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_thoughts: Option<bool>,
}

/// Built-in tools the model may call. Each is enabled by its presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Tool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_search: Option<Enabled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_context: Option<Enabled>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_execution: Option<Enabled>,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: Some(Enabled {}),
            ..Default::default()
        }
    }
}

/// Empty marker object (`{}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enabled {}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), GatewayError> {
        let invalid = |msg: &str| Err(GatewayError::InvalidConfig(msg.into()));

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return invalid("temperature must be between 0 and 2");
            }
        }
        if let Some(p) = self.top_p {
            if !(0.0..=1.0).contains(&p) {
                return invalid("topP must be between 0 and 1");
            }
        }
        if self.top_k == Some(0) {
            return invalid("topK must be positive");
        }
        if self.candidate_count == Some(0) {
            return invalid("candidateCount must be positive");
        }
        if self.max_output_tokens == Some(0) {
            return invalid("maxOutputTokens must be positive");
        }
        // -1 asks the provider for a dynamic budget
        if let Some(budget) = self.thinking_config.as_ref().and_then(|t| t.thinking_budget) {
            if budget < -1 {
                return invalid("thinkingBudget must be -1 or greater");
            }
        }
        if self.tools.iter().any(|t| *t == Tool::default()) {
            return invalid("tool entries must enable at least one tool");
        }
        Ok(())
    }

    /// Sampling and output options, as sent under `generationConfig`.
    fn generation_config(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |key: &str, value: Value| {
            map.insert(key.to_string(), value);
        };

        if let Some(v) = self.temperature {
            put("temperature", json!(v));
        }
        if let Some(v) = self.top_p {
            put("topP", json!(v));
        }
        if let Some(v) = self.top_k {
            put("topK", json!(v));
        }
        if let Some(v) = self.candidate_count {
            put("candidateCount", json!(v));
        }
        if let Some(v) = self.max_output_tokens {
            put("maxOutputTokens", json!(v));
        }
        if !self.stop_sequences.is_empty() {
            put("stopSequences", json!(self.stop_sequences));
        }
        if let Some(v) = &self.response_mime_type {
            put("responseMimeType", json!(v));
        }
        if let Some(v) = &self.response_schema {
            put("responseSchema", v.clone());
        }
        if let Some(v) = &self.thinking_config {
            put("thinkingConfig", json!(v));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_config_keys_are_rejected() {
        let result = serde_json::from_value::<GenerateRequest>(json!({
            "model": "gemini-2.5-flash",
            "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
            "config": {"temprature": 0.5}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn prompt_request_is_valid() {
        let req = GenerateRequest::from_prompt("gemini-2.5-pro", "hello");
        assert!(req.provider.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn function_call_turns_are_forwarded_unchanged() {
        let contents = json!([
            {
                "role": "model",
                "parts": [{
                    "functionCall": { "name": "search", "args": { "q": "perovskite" } },
                    "thoughtSignature": "sig"
                }]
            },
            {
                "role": "user",
                "parts": [{
                    "functionResponse": { "name": "search", "response": { "hits": 3 } }
                }]
            },
            {
                "role": "model",
                "parts": [
                    { "executableCode": { "language": "PYTHON", "code": "print(1)" } },
                    { "codeExecutionResult": { "outcome": "OUTCOME_OK", "output": "1" } }
                ]
            }
        ]);
        let req: GenerateRequest = serde_json::from_value(json!({
            "model": "gemini-2.5-pro",
            "contents": contents.clone(),
        }))
        .unwrap();

        assert_eq!(req.wire_body()["contents"], contents);
    }

    #[test]
    fn system_instruction_accepts_every_form() {
        let forms = [
            json!("be terse"),
            json!({ "parts": [{ "text": "be terse" }] }),
            json!([{ "text": "be terse" }]),
        ];
        for form in forms {
            let req: GenerateRequest = serde_json::from_value(json!({
                "model": "gemini-2.5-pro",
                "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }],
                "config": { "systemInstruction": form },
            }))
            .unwrap();
            assert!(req.validate().is_ok());
            assert_eq!(
                req.wire_body()["systemInstruction"],
                json!({ "parts": [{ "text": "be terse" }] })
            );
        }
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let mut req = GenerateRequest::from_prompt("gemini-2.5-pro", "hello");
        req.config = Some(GenerationConfig {
            temperature: Some(3.5),
            ..Default::default()
        });
        assert!(matches!(req.validate(), Err(GatewayError::InvalidConfig(_))));
    }

    #[test]
    fn model_with_path_separator_is_rejected() {
        let req = GenerateRequest::from_prompt("../models/x", "hello");
        assert!(req.validate().is_err());
    }

    #[test]
    fn wire_body_lifts_config_sections() {
        let mut req = GenerateRequest::from_prompt("gemini-2.5-pro", "plan this");
        req.config = Some(GenerationConfig {
            system_instruction: Some("You are a researcher.".into()),
            temperature: Some(0.5),
            thinking_config: Some(ThinkingConfig {
                thinking_budget: Some(2048),
                include_thoughts: None,
            }),
            tools: vec![Tool::google_search()],
            ..Default::default()
        });

        let body = req.wire_body();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "plan this");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are a researcher.");
        assert_eq!(body["tools"], json!([{"googleSearch": {}}]));
        assert_eq!(body["generationConfig"]["temperature"], json!(0.5));
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 2048);
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn wire_body_without_config_has_only_contents() {
        let body = GenerateRequest::from_prompt("m", "x").wire_body();
        assert_eq!(body.as_object().unwrap().len(), 1);
    }
}
