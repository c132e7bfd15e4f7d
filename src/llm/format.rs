//! API 格式检测和 URL 构建工具

use std::fmt;
use std::str::FromStr;

/// API 格式枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    /// Google Generative Language API (Gemini)
    Gemini,
    /// OpenAI Chat Completions API
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
}

impl ApiFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFormat::Gemini => "gemini",
            ApiFormat::OpenAi => "openai",
            ApiFormat::Anthropic => "anthropic",
        }
    }

    /// 各提供方的默认基础 URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ApiFormat::Gemini => "https://generativelanguage.googleapis.com",
            ApiFormat::OpenAi => "https://api.openai.com",
            ApiFormat::Anthropic => "https://api.anthropic.com",
        }
    }
}

impl fmt::Display for ApiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ApiFormat::Gemini),
            "openai" => Ok(ApiFormat::OpenAi),
            "anthropic" | "claude" => Ok(ApiFormat::Anthropic),
            other => Err(format!("unknown AI provider: {}", other)),
        }
    }
}

/// 根据模型名称检测 API 格式
///
/// 规则：以 "gemini" 开头使用 Gemini 格式，包含 "claude" 使用 Anthropic 格式，否则使用 OpenAI 格式
pub fn detect_api_format(model: &str) -> ApiFormat {
    let model = model.to_lowercase();
    if model.starts_with("gemini") || model.starts_with("models/gemini") {
        ApiFormat::Gemini
    } else if model.contains("claude") {
        ApiFormat::Anthropic
    } else {
        ApiFormat::OpenAi
    }
}

/// 修复 base_url
///
/// - 移除末尾斜杠
/// - 修复双斜杠（保留协议部分）
pub fn fix_base_url(base_url: &str) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();

    if let Some(pos) = url.find("://") {
        let (protocol, rest) = url.split_at(pos + 3);
        let fixed_rest = rest.replace("//", "/");
        url = format!("{}{}", protocol, fixed_rest);
    }

    url
}

/// 构建 Gemini generateContent 端点
pub fn build_gemini_endpoint(base_url: &str, model: &str) -> String {
    let url = fix_base_url(base_url);
    let model = model.trim_start_matches("models/");

    if url.ends_with("/v1beta") || url.ends_with("/v1") {
        format!("{}/models/{}:generateContent", url, model)
    } else {
        format!("{}/v1beta/models/{}:generateContent", url, model)
    }
}

/// 构建 OpenAI Chat Completions 端点
pub fn build_openai_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/chat/completions") {
        url
    } else if url.ends_with("/v1") {
        format!("{}/chat/completions", url)
    } else {
        format!("{}/v1/chat/completions", url)
    }
}

/// 构建 Anthropic Messages 端点
pub fn build_anthropic_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/messages") {
        url
    } else if url.ends_with("/v1") {
        format!("{}/messages", url)
    } else {
        format!("{}/v1/messages", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_api_format() {
        assert_eq!(detect_api_format("gemini-1.5-flash"), ApiFormat::Gemini);
        assert_eq!(detect_api_format("models/gemini-pro"), ApiFormat::Gemini);
        assert_eq!(detect_api_format("gpt-4o"), ApiFormat::OpenAi);
        assert_eq!(detect_api_format("deepseek-chat"), ApiFormat::OpenAi);
        assert_eq!(detect_api_format("Claude-3-Sonnet"), ApiFormat::Anthropic);
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!("Gemini".parse::<ApiFormat>(), Ok(ApiFormat::Gemini));
        assert_eq!(" openai ".parse::<ApiFormat>(), Ok(ApiFormat::OpenAi));
        assert_eq!("anthropic".parse::<ApiFormat>(), Ok(ApiFormat::Anthropic));
        assert!("huggingface".parse::<ApiFormat>().is_err());
    }

    #[test]
    fn test_fix_base_url() {
        assert_eq!(fix_base_url("https://api.openai.com/"), "https://api.openai.com");
        assert_eq!(fix_base_url("https://api.openai.com//v1"), "https://api.openai.com/v1");
    }

    #[test]
    fn test_build_gemini_endpoint() {
        assert_eq!(
            build_gemini_endpoint("https://generativelanguage.googleapis.com", "gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(
            build_gemini_endpoint("https://generativelanguage.googleapis.com/v1beta/", "models/gemini-pro"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_build_openai_endpoint() {
        assert_eq!(
            build_openai_endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            build_openai_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_build_anthropic_endpoint() {
        assert_eq!(
            build_anthropic_endpoint("https://api.anthropic.com"),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            build_anthropic_endpoint("https://api.anthropic.com/v1/messages"),
            "https://api.anthropic.com/v1/messages"
        );
    }
}
