//! 应用配置管理
//!
//! 启动时从进程环境变量读取一次配置，之后只读。缺少模型凭据时启动失败。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;
use crate::llm::{detect_api_format, ApiFormat, GenerationOptions};

/// 允许跨域访问的本地开发来源
pub const ALLOWED_ORIGINS: &[&str] = &["http://localhost", "http://localhost:5173"];

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// 应用配置结构体
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 监听端口（绑定 0.0.0.0）
    pub port: u16,
    /// 模型提供方 API 密钥
    pub api_key: String,
    /// 模型提供方
    pub provider: ApiFormat,
    /// 模型名称
    pub model: String,
    /// API 基础 URL
    pub base_url: String,
    /// 温度参数，未设置时由提供方决定
    pub temperature: Option<f64>,
    /// 最大输出 token 数
    pub max_tokens: u32,
    /// 跨域白名单
    pub allowed_origins: Vec<String>,
    /// 模型调用日志目录，未设置时不记录
    pub request_log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空字符串视同未设置
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("AI_API_KEY")
            .or_else(|| get("GEMINI_API_KEY"))
            .ok_or_else(|| {
                AppError::Config(
                    "model API key is not set (expected GEMINI_API_KEY or AI_API_KEY)".to_string(),
                )
            })?;

        let port = match get("AI_SERVICE_PORT") {
            Some(v) => parse_var("AI_SERVICE_PORT", &v)?,
            None => DEFAULT_PORT,
        };

        let model = get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let provider = match get("AI_PROVIDER") {
            Some(v) => ApiFormat::from_str(&v).map_err(AppError::Config)?,
            None => detect_api_format(&model),
        };

        let base_url = get("AI_BASE_URL").unwrap_or_else(|| provider.default_base_url().to_string());

        let temperature = match get("AI_TEMPERATURE") {
            Some(v) => {
                let t: f64 = parse_var("AI_TEMPERATURE", &v)?;
                if !(0.0..=2.0).contains(&t) {
                    return Err(AppError::Config(format!(
                        "AI_TEMPERATURE must be between 0.0 and 2.0, got {}",
                        t
                    )));
                }
                Some(t)
            }
            None => None,
        };

        let max_tokens = match get("AI_MAX_TOKENS") {
            Some(v) => parse_var("AI_MAX_TOKENS", &v)?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            port,
            api_key,
            provider,
            model,
            base_url,
            temperature,
            max_tokens,
            allowed_origins: ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            request_log_dir: get("AI_REQUEST_LOG_DIR").map(PathBuf::from),
        })
    }

    /// 监听地址
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// 模型生成参数
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| AppError::Config(format!("invalid value for {}: {:?}", key, value)))
}
