/// LLM Client: the single point of entry for all generative-AI calls in SocialForge.
///
/// ARCHITECTURAL RULE: No other module may call the generateContent API directly.
/// All model interactions MUST go through this module.
///
/// Models are hardcoded per pipeline step; do not make them configurable.
use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::media::{InlineImage, DEFAULT_IMAGE_MIME};

pub mod schema;

use schema::Schema;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Strong reasoning model: brand analysis and critique.
pub const ANALYSIS_MODEL: &str = "gemini-3-pro-preview";
/// Fast text model: copywriting.
pub const COPY_MODEL: &str = "gemini-2.5-flash";
/// Image generation/editing model.
pub const IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API key not found in environment variables (GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

/// One piece of a message: either text or inline binary data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineImage>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    pub fn image(image: InlineImage) -> Self {
        Self {
            text: None,
            inline_data: Some(image),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: &'a [Part],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Schema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

impl LlmResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Why the first candidate stopped, e.g. `STOP` or `SAFETY`.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Concatenated text of the first candidate, if it has any text parts.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    /// First inline image of the first candidate. A missing media type becomes `image/png`.
    pub fn first_inline_image(&self) -> Option<InlineImage> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| InlineImage {
                mime_type: if d.mime_type.is_empty() {
                    DEFAULT_IMAGE_MIME.to_string()
                } else {
                    d.mime_type.clone()
                },
                data: d.data.clone(),
            })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single generative-AI client used by all pipeline steps.
/// A missing API key is not an error until the first call.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    /// `base_url` comes from config and defaults to [`DEFAULT_BASE_URL`].
    pub fn with_base_url(
        api_key: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes one generateContent call, returning the full response object. No retries.
    pub async fn generate(
        &self,
        model: &str,
        parts: &[Part],
        response_schema: Option<&Schema>,
    ) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = GenerateContentRequest {
            contents: vec![RequestContent { role: "user", parts }],
            generation_config: response_schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        };

        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                model,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "LLM call succeeded"
            );
        }

        Ok(llm_response)
    }

    /// Calls the model with a response schema and deserializes the text response as JSON.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        parts: &[Part],
        schema: &Schema,
    ) -> Result<T, LlmError> {
        let response = self.generate(model, parts, Some(schema)).await?;

        let text = response.text().ok_or_else(|| {
            warn!(
                model,
                finish_reason = response.finish_reason().unwrap_or("unknown"),
                "LLM returned no text"
            );
            LlmError::EmptyContent
        })?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response_from(value: serde_json::Value) -> LlmResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_text_concatenates_first_candidate_parts() {
        let response = response_from(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"a\":" }, { "text": " 1}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_finish_reason_reads_first_candidate() {
        let blocked = response_from(json!({
            "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
        }));
        assert_eq!(blocked.finish_reason(), Some("SAFETY"));
        assert!(blocked.text().is_none());

        assert!(response_from(json!({})).finish_reason().is_none());
    }

    #[test]
    fn test_text_is_none_without_candidates() {
        let response = response_from(json!({}));
        assert!(response.text().is_none());
        assert!(response.first_inline_image().is_none());
    }

    #[test]
    fn test_first_inline_image_skips_text_and_defaults_mime() {
        let response = response_from(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "data": "AAAA" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "BBBB" } }
                ]}
            }]
        }));
        let image = response.first_inline_image().unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "AAAA");
    }

    #[test]
    fn test_first_inline_image_ignores_empty_payload() {
        let response = response_from(json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "" } },
                    { "inlineData": { "mimeType": "image/webp", "data": "CCCC" } }
                ]}
            }]
        }));
        assert_eq!(response.first_inline_image().unwrap().mime_type, "image/webp");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let server = MockServer::start().await;
        let llm = LlmClient::with_base_url(None, 5, &server.uri()).unwrap();

        let err = llm
            .generate(COPY_MODEL, &[Part::text("hi")], None)
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::MissingApiKey));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_json_sends_schema_and_parses_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"ok\": true}" }] } }],
                "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4, "totalTokenCount": 7 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url(Some("test-key".to_string()), 5, &server.uri()).unwrap();
        let schema = Schema::object(vec![("ok", Schema::boolean())]);
        let value: serde_json::Value = llm
            .generate_json(COPY_MODEL, &[Part::text("prompt")], &schema)
            .await
            .unwrap();
        assert_eq!(value, json!({ "ok": true }));

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["responseSchema"]["required"], json!(["ok"]));
    }

    #[tokio::test]
    async fn test_generate_without_schema_omits_generation_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url(Some("k".to_string()), 5, &server.uri()).unwrap();
        llm.generate(IMAGE_MODEL, &[Part::text("draw")], None)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = requests[0].body_json().unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url(Some("bad".to_string()), 5, &server.uri()).unwrap();
        let err = llm
            .generate(ANALYSIS_MODEL, &[Part::text("x")], None)
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_json_empty_candidate_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [] }, "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let llm = LlmClient::with_base_url(Some("k".to_string()), 5, &server.uri()).unwrap();
        let result: Result<serde_json::Value, _> = llm
            .generate_json(COPY_MODEL, &[Part::text("x")], &Schema::string())
            .await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }
}
