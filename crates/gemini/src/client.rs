//! Gemini `generateContent` client.
//!
//! Sends one non-streaming request per completion with a JSON response
//! schema, and returns the concatenated text parts of the first candidate.
//! There is no retry loop and no client-side timeout.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slidegen_core::{CompletionClient, CompletionRequest, Error, Result};

use crate::config::GeminiConfig;

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Creates a client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The active configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Sends the request and returns the raw response.
    async fn send_request(&self, body: &GenerateContentRequest<'_>) -> Result<Response> {
        self.client
            .post(self.config.endpoint())
            .header("x-goog-api-key", self.config.api_key())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Transport(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    Error::Transport(format!("Connection failed: {}", e))
                } else {
                    Error::Transport(e.to_string())
                }
            })
    }

    /// Maps non-success statuses to transport errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        log::warn!("Gemini returned {}: {}", status, error_body);

        Err(status_error(status, &error_body, &self.config.model))
    }
}

fn status_error(status: StatusCode, body: &str, model: &str) -> Error {
    match status.as_u16() {
        400 => Error::Transport(format!("Invalid request: {}", body)),
        401 | 403 => Error::Transport("Authentication failed; check the API key".to_string()),
        404 => Error::Transport(format!("Model '{}' not found", model)),
        429 => Error::Transport("Rate limited by the Gemini API".to_string()),
        _ => Error::Transport(format!("Unexpected status {}: {}", status, body)),
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = GenerateContentRequest::from_completion(request);
        log::debug!(
            "POST {} (prompt {} chars, temperature {})",
            self.config.endpoint(),
            request.prompt.len(),
            request.temperature
        );

        let response = self.send_request(&body).await?;
        let response = self.handle_response_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Failed to parse response: {}", e)))?;

        parsed.into_text()
    }
}

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    temperature: f32,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_completion(request: &'a CompletionRequest) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema,
                temperature: request.temperature,
            },
        }
    }
}

/// Response body of `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({})", r))
                .unwrap_or_else(|| "no candidates in response".to_string());
            return Err(Error::Transport(reason));
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                log::warn!("Gemini finished with reason {}", reason);
            }
        }

        Ok(candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use slidegen_core::generator::{build_prompt, slide_schema, GENERATION_TEMPERATURE};

    fn status_message(code: u16, body: &str) -> String {
        let status = StatusCode::from_u16(code).unwrap();
        match status_error(status, body, "gemini-2.5-flash") {
            Error::Transport(message) => message,
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_status_errors_are_transport_failures() {
        assert_eq!(status_message(400, "bad schema"), "Invalid request: bad schema");
        assert!(status_message(401, "").contains("API key"));
        assert!(status_message(403, "").contains("API key"));
        assert_eq!(status_message(404, ""), "Model 'gemini-2.5-flash' not found");
        assert!(status_message(429, "").starts_with("Rate limited"));
        assert_eq!(
            status_message(500, "boom"),
            "Unexpected status 500 Internal Server Error: boom"
        );
    }

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            prompt: build_prompt("The sky is blue."),
            schema: slide_schema(),
            temperature: GENERATION_TEMPERATURE,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = sample_request();
        let body = serde_json::to_value(GenerateContentRequest::from_completion(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], request.prompt.as_str());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], slide_schema());
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "[{\"title\":"}, {"text": "\"A\",\"content\":[]}]"}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10}
        }))
        .unwrap();

        assert_eq!(
            response.into_text().unwrap(),
            r#"[{"title":"A","content":[]}]"#
        );
    }

    #[test]
    fn test_blocked_prompt_is_transport_error() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        match response.into_text() {
            Err(Error::Transport(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_candidate_without_content_is_empty_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .unwrap();

        assert_eq!(response.into_text().unwrap(), "");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = GeminiConfig::new("key").with_base_url("http://127.0.0.1:9");
        let client = GeminiClient::new(config).unwrap();

        let err = client.complete(&sample_request()).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
