//! 统一 LLM 客户端

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use super::anthropic::generate_anthropic;
use super::format::ApiFormat;
use super::gemini::generate_gemini;
use super::openai::{collect_stream, stream_openai};
use super::types::{GenerationOptions, LlmError};
use crate::utils::RequestLogger;

/// 模型客户端能力
///
/// 处理器只依赖这一接口：给定 prompt，最终返回文本或失败。
/// 实现必须可在多个请求间并发共享。
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// 统一 LLM 客户端
///
/// 根据 API 格式分发到 Gemini、OpenAI 或 Anthropic 实现
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    format: ApiFormat,
    options: GenerationOptions,
    logger: Option<Arc<RequestLogger>>,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        format: ApiFormat,
        options: GenerationOptions,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::ConfigError("API key is required".to_string()));
        }

        // 超时由客户端自身负责，处理器不再另设
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            model: model.into(),
            format,
            options,
            logger: None,
        })
    }

    /// 附加模型调用日志
    pub fn with_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn format(&self) -> ApiFormat {
        self.format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &str) -> Result<String, LlmError> {
        match self.format {
            ApiFormat::Gemini => {
                generate_gemini(
                    &self.client,
                    &self.api_key,
                    &self.base_url,
                    &self.model,
                    prompt,
                    &self.options,
                )
                .await
            }
            ApiFormat::OpenAi => {
                let stream = stream_openai(
                    &self.client,
                    &self.api_key,
                    &self.base_url,
                    &self.model,
                    prompt,
                    &self.options,
                );
                collect_stream(stream).await
            }
            ApiFormat::Anthropic => {
                generate_anthropic(
                    &self.client,
                    &self.api_key,
                    &self.base_url,
                    &self.model,
                    prompt,
                    &self.options,
                )
                .await
            }
        }
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        info!("LLM request: provider={}, model={}", self.format, self.model);

        let start_time = Instant::now();
        let entry = self.logger.as_ref().map(|logger| {
            logger.log_request(
                &RequestLogger::generate_request_id(),
                self.format.as_str(),
                &self.base_url,
                &self.model,
                prompt,
                &self.api_key,
            )
        });

        let result = self.dispatch(prompt).await;

        if let (Some(logger), Some(entry)) = (self.logger.as_ref(), entry) {
            match &result {
                Ok(text) => logger.log_success(entry, start_time, text).await,
                Err(e) => logger.log_error(entry, start_time, e).await,
            }
        }

        result
    }
}
