//! Anthropic Messages API 实现

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::format::build_anthropic_endpoint;
use super::types::{ChatMessage, GenerationOptions, LlmError};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic 请求载荷
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

/// Anthropic 响应
#[derive(Deserialize, Debug)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// 调用 Anthropic Messages API
pub async fn generate_anthropic(
    client: &Client,
    api_key: &str,
    base_url: &str,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String, LlmError> {
    let endpoint = build_anthropic_endpoint(base_url);

    let payload = AnthropicRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };

    debug!("Anthropic API request: endpoint={}, model={}", endpoint, model);

    let response = client
        .post(&endpoint)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!(
            "Anthropic API error: status={}, body={}",
            status.as_u16(),
            body.chars().take(500).collect::<String>()
        );
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    extract_text(&body)
}

fn extract_text(body: &str) -> Result<String, LlmError> {
    let response: AnthropicResponse = serde_json::from_str(body)?;

    let text: String = response
        .content
        .into_iter()
        .filter(|b| b.block_type == "text")
        .filter_map(|b| b.text)
        .collect();

    if text.is_empty() {
        if response.stop_reason.as_deref() == Some("refusal") {
            return Err(LlmError::Blocked("refusal".to_string()));
        }
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock_server::{local_client, serve_once};

    #[test]
    fn test_extract_text() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Use a HashMap."}
            ],
            "stop_reason": "end_turn"
        }"#;
        assert_eq!(extract_text(body).unwrap(), "Use a HashMap.");
    }

    #[test]
    fn test_extract_text_empty() {
        assert!(matches!(
            extract_text(r#"{"content": [], "stop_reason": "max_tokens"}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(r#"{"content": [], "stop_reason": "refusal"}"#),
            Err(LlmError::Blocked(_))
        ));
    }

    #[tokio::test]
    async fn test_overloaded_is_api_error() {
        let body = br#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let base_url = serve_once(529, "application/json", vec![body.to_vec()]).await;

        let result = generate_anthropic(
            &local_client(),
            "test-key",
            &base_url,
            "claude-3-5-haiku-latest",
            "Explain",
            &GenerationOptions::default(),
        )
        .await;

        match result {
            Err(LlmError::ApiError { status, message }) => {
                assert_eq!(status, 529);
                assert!(message.contains("overloaded_error"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }
}
