//! Gemini `generateContent` client.

use super::{GenerationClient, GenerationClientError, GenerationRequest, ResponseFormat};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, GenerationClientError> {
        let http = Client::builder()
            .user_agent("studypack/gemini")
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Build the request body for the Gemini `generateContent` API.
    fn build_request_body(request: &GenerationRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
        });

        if let Some(system) = request.system.as_ref() {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }
        if request.format == ResponseFormat::Json {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        body
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, GenerationClientError> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(GenerationClientError::InvalidResponse(format!(
                "prompt blocked by provider: {reason}"
            )));
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            GenerationClientError::InvalidResponse("response contained no candidates".into())
        })?;
        let finish_reason = candidate.finish_reason;
        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(GenerationClientError::InvalidResponse(format!(
                "candidate contained no text (finish reason: {})",
                finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationClientError> {
        let body = Self::build_request_body(&request);
        tracing::debug!(model = %self.model, format = ?request.format, "Gemini request");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach Gemini at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::ProviderUnavailable(format!(
                "Gemini endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Gemini returned {status}: {body}"
            )));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Gemini response: {error}"
            ))
        })?;

        body.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use std::time::Duration;

    fn test_client(base_url: String) -> GeminiClient {
        GeminiClient {
            http: Client::builder()
                .user_agent("studypack-test")
                .timeout(Duration::from_secs(5))
                .build()
                .expect("client"),
            base_url,
            model: "gemini-test".into(),
            api_key: "test-key".into(),
        }
    }

    fn text_request() -> GenerationRequest {
        GenerationRequest {
            system: None,
            prompt: "Summarize".into(),
            format: ResponseFormat::Text,
        }
    }

    #[test]
    fn request_body_carries_system_and_json_mode() {
        let body = GeminiClient::build_request_body(&GenerationRequest {
            system: Some("Return JSON only.".into()),
            prompt: "Content".into(),
            format: ResponseFormat::Json,
        });

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "Return JSON only."
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Content");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn text_request_omits_optional_fields() {
        let body = GeminiClient::build_request_body(&text_request());
        assert!(body.get("system_instruction").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn gemini_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-test:generateContent")
                    .header("x-goog-api-key", "test-key");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "- point one\n" }, { "text": "- point two" }] },
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let text = client.generate(text_request()).await.expect("text");

        mock.assert();
        assert_eq!(text, "- point one\n- point two");
    }

    #[tokio::test]
    async fn gemini_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).body("quota exceeded");
            })
            .await;

        let error = client.generate(text_request()).await.expect_err("error");
        assert!(
            matches!(error, GenerationClientError::GenerationFailed(ref message) if message.contains("429")),
            "unexpected error: {error:?}"
        );
    }

    #[tokio::test]
    async fn gemini_client_reports_missing_endpoint() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(404);
            })
            .await;

        let error = client.generate(text_request()).await.expect_err("error");
        assert!(matches!(error, GenerationClientError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn gemini_client_rejects_blocked_prompts() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [],
                    "promptFeedback": { "blockReason": "SAFETY" }
                }));
            })
            .await;

        let error = client.generate(text_request()).await.expect_err("error");
        assert!(
            matches!(error, GenerationClientError::InvalidResponse(ref message) if message.contains("SAFETY"))
        );
    }

    #[tokio::test]
    async fn gemini_client_rejects_empty_candidates() {
        let server = MockServer::start_async().await;
        let client = test_client(server.base_url());

        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let error = client.generate(text_request()).await.expect_err("error");
        assert!(matches!(error, GenerationClientError::InvalidResponse(_)));
    }
}
