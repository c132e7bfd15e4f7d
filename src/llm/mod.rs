//! LLM 模块
//!
//! 提供统一的模型客户端，支持 Gemini、OpenAI 和 Anthropic API 格式。

mod anthropic;
mod client;
mod format;
mod gemini;
#[cfg(test)]
mod mock_server;
mod openai;
#[cfg(test)]
pub mod stub;
mod types;

pub use client::{LlmClient, ModelClient};
pub use format::{detect_api_format, ApiFormat};
pub use types::*;
