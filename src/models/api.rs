//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};

/// 根路径响应
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// 摘要请求
///
/// `text` 在处理器中校验，缺失或为空时返回 400
#[derive(Debug, Default, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// 摘要响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// 建议意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// 解释代码片段
    Explain,
    /// 修正 / 改进代码，未知取值也按此处理
    #[default]
    #[serde(other)]
    Suggest,
}

/// 建议请求
#[derive(Debug, Default, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub code_snippet: Option<String>,
    #[serde(default)]
    pub intent: Intent,
}

/// 建议响应
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub suggestion: String,
    pub explanation: String,
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: String,
    pub model: String,
}
