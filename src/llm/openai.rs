//! OpenAI 兼容 Chat Completions API 实现
//!
//! 以 SSE 流式请求，逐块收集为完整回答。兼容 Ollama、DeepSeek 等 OpenAI 格式服务。

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tracing::{debug, error};

use super::format::build_openai_endpoint;
use super::types::{ChatMessage, GenerationOptions, LlmError};

/// 流中途出错时上游已返回 200，按网关错误记录
const MID_STREAM_ERROR_STATUS: u16 = 502;

/// 文本增量流
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    max_tokens: u32,
}

/// OpenAI SSE 响应块
#[derive(Deserialize, Debug)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    /// 流中途返回的错误对象
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    delta: OpenAiDelta,
}

#[derive(Deserialize, Debug)]
struct OpenAiDelta {
    content: Option<String>,
}

/// 单行 SSE 解析结果
#[derive(Debug, PartialEq)]
enum SseLine {
    /// 文本增量
    Delta(String),
    /// 流结束标记
    Done,
    /// 上游在流中返回的错误
    Error(String),
    /// 空行、注释、无内容的块
    Skip,
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(OpenAiStreamChunk {
            error: Some(error), ..
        }) => SseLine::Error(
            error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        ),
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .map(SseLine::Delta)
            .unwrap_or(SseLine::Skip),
        Err(e) => {
            debug!("Failed to parse OpenAI chunk: {}, data: {}", e, data);
            SseLine::Skip
        }
    }
}

/// 流式调用 OpenAI API
pub fn stream_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
) -> TextStream {
    let endpoint = build_openai_endpoint(base_url);
    let client = client.clone();
    let api_key = api_key.to_string();
    let payload = OpenAiRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        stream: true,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
    };

    Box::pin(try_stream! {
        debug!("OpenAI API request: endpoint={}, model={}", endpoint, payload.model);

        let response = client
            .post(&endpoint)
            .bearer_auth(&api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "OpenAI API error: status={}, body={}",
                status_code,
                error_text.chars().take(500).collect::<String>()
            );
            Err::<(), _>(LlmError::ApiError {
                status: status_code,
                message: error_text,
            })?;
            return;
        }

        // 按字节缓冲，只对完整的行做 UTF-8 解码，避免多字节字符被分块截断
        let mut buffer: Vec<u8> = Vec::new();
        let mut bytes_stream = response.bytes_stream();

        while let Some(chunk_result) = bytes_stream.next().await {
            let bytes = chunk_result?;
            buffer.extend_from_slice(&bytes);

            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line)) {
                    SseLine::Delta(text) => yield text,
                    SseLine::Done => return,
                    SseLine::Error(message) => {
                        error!("OpenAI stream error: {}", message);
                        Err::<(), _>(LlmError::ApiError {
                            status: MID_STREAM_ERROR_STATUS,
                            message,
                        })?;
                        return;
                    }
                    SseLine::Skip => {}
                }
            }
        }

        // 处理未以换行结尾的最后一行
        match parse_sse_line(&String::from_utf8_lossy(&buffer)) {
            SseLine::Delta(text) => yield text,
            SseLine::Error(message) => {
                Err::<(), _>(LlmError::ApiError {
                    status: MID_STREAM_ERROR_STATUS,
                    message,
                })?;
            }
            SseLine::Done | SseLine::Skip => {}
        }
    })
}

/// 收集流为完整文本
pub async fn collect_stream(mut stream: TextStream) -> Result<String, LlmError> {
    let mut content = String::new();
    while let Some(delta) = stream.next().await {
        content.push_str(&delta?);
    }

    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content)
}
