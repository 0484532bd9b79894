//! Anthropic native provider implementation.
//!
//! Uses Anthropic's Messages API directly.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field
//! - Client-side request timeout

use async_trait::async_trait;
use cbc_tutor_core::error::ProviderError;
use cbc_tutor_core::message::{Turn, TurnRole};
use cbc_tutor_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anthropic native Messages API provider.
pub struct AnthropicProvider {
    name: String,
    base_url: String,
    api_key: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the default 30s timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a provider whose HTTP calls give up after `timeout`.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert turns to Anthropic API messages.
    ///
    /// The API requires the first message to come from the user, so a window
    /// that opens on an assistant turn drops it.
    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage<'_>> {
        turns
            .iter()
            .skip_while(|t| t.role == TurnRole::Assistant)
            .map(|t| ApiMessage {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect()
    }

    /// Pull the generated text out of an Anthropic API response.
    fn response_to_generation(
        resp: MessagesResponse,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let text = resp
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text),
                ResponseContentBlock::Other => None,
            })
            .ok_or_else(|| {
                ProviderError::MalformedResponse("response contained no text content".into())
            })?;

        Ok(GenerationResponse {
            text,
            model: resp.model,
            usage: resp.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout(format!(
                "Anthropic did not answer within {}s",
                self.timeout.as_secs()
            ))
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: Self::to_api_messages(&request.messages),
        };

        debug!(
            provider = "anthropic",
            model = %request.model,
            messages = body.messages.len(),
            "Sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();

        if status == 401 || status == 403 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, "Anthropic rejected the API key");
            return Err(ProviderError::AuthenticationFailed {
                status_code: status,
                message: if error_body.is_empty() {
                    "Invalid Anthropic API key".into()
                } else {
                    error_body
                },
            });
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Anthropic API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse Anthropic response: {e}")))?;

        Self::response_to_generation(api_resp)
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(!self.api_key.is_empty())
    }
}

// --- Anthropic API types ---

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ResponseContentBlock>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ResponseContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use cbc_tutor_core::curriculum::{GradeLevel, LearnerRole};

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 4000,
            system: "You are a CBC tutor".into(),
            messages: vec![
                Turn::user("Create a worksheet on fractions"),
                Turn::assistant("Here is a worksheet"),
                Turn::user("Add answers"),
            ],
            context: LessonContext {
                grade: GradeLevel::new(4).unwrap(),
                subject: "Mathematics".into(),
                role: LearnerRole::Teacher,
            },
        }
    }

    #[test]
    fn constructor() {
        let provider = AnthropicProvider::new("sk-ant-test").unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
        assert_eq!(provider.timeout, Duration::from_secs(30));
    }

    #[test]
    fn debug_redacts_key() {
        let provider = AnthropicProvider::new("sk-ant-secret").unwrap();
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-ant-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn constructor_with_base_url() {
        let provider = AnthropicProvider::new("sk-ant-test")
            .unwrap()
            .with_base_url("https://custom.proxy.com/");
        assert_eq!(provider.base_url(), "https://custom.proxy.com");
    }

    #[test]
    fn message_conversion_keeps_order_and_roles() {
        let req = request();
        let api_msgs = AnthropicProvider::to_api_messages(&req.messages);
        assert_eq!(api_msgs.len(), 3);
        assert_eq!(api_msgs[0].role, "user");
        assert_eq!(api_msgs[1].role, "assistant");
        assert_eq!(api_msgs[2].content, "Add answers");
    }

    #[test]
    fn message_conversion_drops_leading_assistant_turns() {
        let turns = vec![
            Turn::assistant("answer 6"),
            Turn::user("question 7"),
            Turn::assistant("answer 7"),
        ];
        let api_msgs = AnthropicProvider::to_api_messages(&turns);
        assert_eq!(api_msgs.len(), 2);
        assert_eq!(api_msgs[0].role, "user");
        assert_eq!(api_msgs[0].content, "question 7");
    }

    #[test]
    fn request_body_shape() {
        let req = request();
        let body = MessagesRequest {
            model: &req.model,
            max_tokens: req.max_tokens,
            system: &req.system,
            messages: AnthropicProvider::to_api_messages(&req.messages),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 4000);
        assert_eq!(json["system"], "You are a CBC tutor");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn parse_text_response() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "id": "msg_01",
                "model": "claude-sonnet-4-20250514",
                "content": [{"type": "text", "text": "Habari!"}],
                "usage": {"input_tokens": 10, "output_tokens": 5},
                "stop_reason": "end_turn"
            }"#,
        )
        .unwrap();

        let gen_resp = AnthropicProvider::response_to_generation(resp).unwrap();
        assert_eq!(gen_resp.text, "Habari!");
        assert_eq!(gen_resp.usage.unwrap().output_tokens, 5);
    }

    #[test]
    fn first_text_block_wins() {
        let resp: MessagesResponse = serde_json::from_str(
            r#"{
                "model": "m",
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "first"},
                    {"type": "text", "text": "second"}
                ]
            }"#,
        )
        .unwrap();
        let gen_resp = AnthropicProvider::response_to_generation(resp).unwrap();
        assert_eq!(gen_resp.text, "first");
        assert!(gen_resp.usage.is_none());
    }

    #[test]
    fn empty_content_is_malformed() {
        let resp: MessagesResponse =
            serde_json::from_str(r#"{"model": "m", "content": []}"#).unwrap();
        assert!(matches!(
            AnthropicProvider::response_to_generation(resp),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn generate_against_local_server() {
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("sk-ant-test") {
                    return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
                }
                let turns = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
                let text = format!("{} turns, system: {}", turns, body["system"].as_str().unwrap_or(""));
                (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "model": body["model"],
                        "content": [{"type": "text", "text": text}],
                        "usage": {"input_tokens": 3, "output_tokens": 4}
                    })),
                )
            }),
        );
        let base = spawn_server(app).await;

        let provider = AnthropicProvider::new("sk-ant-test").unwrap().with_base_url(&base);
        let resp = provider.generate(request()).await.unwrap();
        assert_eq!(resp.text, "3 turns, system: You are a CBC tutor");
        assert_eq!(resp.model, "claude-sonnet-4-20250514");

        let bad_key = AnthropicProvider::new("wrong").unwrap().with_base_url(&base);
        let err = bad_key.generate(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed { .. }));
        assert_eq!(err.status_code(), Some(401));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }),
        );
        let base = spawn_server(app).await;

        let provider = AnthropicProvider::new("sk-ant-test").unwrap().with_base_url(&base);
        match provider.generate(request()).await {
            Err(ProviderError::ApiError { status_code, message }) => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_maps_to_malformed() {
        let app = Router::new().route("/v1/messages", post(|| async { "not json" }));
        let base = spawn_server(app).await;

        let provider = AnthropicProvider::new("sk-ant-test").unwrap().with_base_url(&base);
        assert!(matches!(
            provider.generate(request()).await,
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = AnthropicProvider::new("sk-ant-test")
            .unwrap()
            .with_base_url(format!("http://{addr}"));
        let err = provider.generate(request()).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn health_check_requires_key() {
        assert!(AnthropicProvider::new("sk").unwrap().health_check().await.unwrap());
        assert!(!AnthropicProvider::new("").unwrap().health_check().await.unwrap());
    }
}
