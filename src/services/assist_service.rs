//! 摘要与建议服务
//!
//! 校验输入、构建 prompt、调用模型并整理输出

use std::sync::Arc;
use tracing::info;

use super::prompt_service::PromptService;
use super::response_parser::split_suggestion;
use crate::error::{AppError, AppResult};
use crate::llm::ModelClient;
use crate::models::{SuggestRequest, SuggestResponse, SummarizeRequest, SummarizeResponse};

/// 摘要与建议服务
///
/// 模型客户端在启动时注入，之后只读，可被并发请求共享
#[derive(Clone)]
pub struct AssistService {
    model: Arc<dyn ModelClient>,
    prompts: Arc<PromptService>,
}

impl AssistService {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            prompts: Arc::new(PromptService::new()),
        }
    }

    /// 生成问题描述摘要，模型输出原样返回
    pub async fn summarize(&self, req: SummarizeRequest) -> AppResult<SummarizeResponse> {
        let text = req
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("text is required".to_string()))?;

        info!("Summarize request: text_len={}", text.len());

        let prompt = self.prompts.build_summarize_prompt(&text);
        let summary = self.model.generate(&prompt).await?;

        Ok(SummarizeResponse { summary })
    }

    /// 生成代码建议或解释
    pub async fn suggest(&self, req: SuggestRequest) -> AppResult<SuggestResponse> {
        let code_snippet = req.code_snippet.unwrap_or_default();

        info!(
            "Suggest request: intent={:?}, text_len={}, code_len={}",
            req.intent,
            req.text.len(),
            code_snippet.len()
        );

        let prompt = self
            .prompts
            .build_suggest_prompt(req.intent, &req.text, &code_snippet);
        let raw = self.model.generate(&prompt).await?;

        Ok(split_suggestion(&raw))
    }
}
