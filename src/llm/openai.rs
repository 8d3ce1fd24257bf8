// OpenAI-compatible chat-completions adapter
// Works against any endpoint speaking the OpenAI wire format (OpenAI,
// OpenRouter, Groq, GLM general API, local gateways).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::llm::provider::LLMAdapter;
use crate::types::{LLMError, LLMMessage, LLMRequest, LLMResponse, LLMResult, TokenUsage};

/// Error codes that mean the account is out of budget rather than broken.
const QUOTA_CODES: &[&str] = &["insufficient_quota", "rate_limit_exceeded"];

pub struct OpenAIAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [LLMMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn is_quota(&self) -> bool {
        let code = self.code.as_ref().and_then(|c| c.as_str());
        [code, self.error_type.as_deref()]
            .into_iter()
            .flatten()
            .any(|value| QUOTA_CODES.contains(&value))
    }
}

impl OpenAIAdapter {
    pub fn new(api_key: &str, api_base: &str, timeout: Duration) -> LLMResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("oxidized-summarizer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LLMError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }

    fn classify_failure(status: StatusCode, body: &str) -> LLMError {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();

        if status == StatusCode::TOO_MANY_REQUESTS || parsed.as_ref().is_some_and(|e| e.error.is_quota()) {
            let message = parsed
                .map(|e| e.error.message)
                .unwrap_or_else(|| format!("{} {}", status, body));
            return LLMError::QuotaExceeded(message);
        }

        let message = match parsed {
            Some(e) => e.error.message,
            None if body.trim().is_empty() => status.canonical_reason().unwrap_or("no body").to_string(),
            None => body.trim().to_string(),
        };
        LLMError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> LLMResult<LLMResponse> {
        let body = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Unavailable(format!("request to {} timed out", self.api_base))
                } else {
                    LLMError::Unavailable(format!("failed to reach {}: {}", self.api_base, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, &error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("failed to decode completion: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::InvalidResponse("completion has no choices".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LLMError::InvalidResponse("completion is empty".to_string()));
        }

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            usage,
        })
    }
}

/// Endpoint that accepts connections and never answers; returns its base URL.
#[cfg(test)]
pub(crate) async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> LLMRequest {
        LLMRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![LLMMessage::system("Be careful."), LLMMessage::user("Summarize this.")],
            max_tokens: None,
            temperature: Some(0.2),
        }
    }

    fn adapter(base: &str) -> OpenAIAdapter {
        OpenAIAdapter::new("test-key", base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            adapter("https://api.openai.com/v1/").endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_successful_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "Be careful."},
                    {"role": "user", "content": "Summarize this."}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": {"role": "assistant", "content": "A short summary."},
                        "finish_reason": "stop"
                    }],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let response = adapter(&server.url()).create_chat_completion(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "A short summary.");
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 16);
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota_exceeded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(json!({"error": {"message": "Rate limit reached", "type": "requests"}}).to_string())
            .create_async()
            .await;

        let err = adapter(&server.url()).create_chat_completion(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::QuotaExceeded(message) if message == "Rate limit reached"));
    }

    #[tokio::test]
    async fn test_insufficient_quota_code_is_quota_exceeded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(403)
            .with_body(
                json!({"error": {"message": "You exceeded your current quota", "type": "insufficient_quota", "code": "insufficient_quota"}})
                    .to_string(),
            )
            .create_async()
            .await;

        let err = adapter(&server.url()).create_chat_completion(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let err = adapter(&server.url()).create_chat_completion(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Api { status: 500, ref message } if message == "boom"));
    }

    #[tokio::test]
    async fn test_empty_completion_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": "   "}}]}).to_string())
            .create_async()
            .await;

        let err = adapter(&server.url()).create_chat_completion(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let err = adapter("http://127.0.0.1:9").create_chat_completion(&request()).await.unwrap_err();
        assert!(matches!(err, LLMError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        let base = silent_server().await;
        let adapter = OpenAIAdapter::new("test-key", &base, Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = adapter.create_chat_completion(&request()).await.unwrap_err();

        assert!(matches!(&err, LLMError::Unavailable(m) if m.contains("timed out")), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
