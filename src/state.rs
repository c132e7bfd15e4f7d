//! 应用状态管理
//!
//! 定义在请求处理器之间共享的状态。启动时构建一次，之后只读。

use std::sync::Arc;

use crate::llm::ModelClient;
use crate::services::AssistService;

/// 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 摘要与建议服务
    pub assist: AssistService,
    /// 模型提供方名称（用于健康检查）
    pub provider: String,
    /// 模型名称（用于健康检查）
    pub model: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(
        client: Arc<dyn ModelClient>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            assist: AssistService::new(client),
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// 创建可共享的应用状态
pub fn create_shared_state(
    client: Arc<dyn ModelClient>,
    provider: impl Into<String>,
    model: impl Into<String>,
) -> Arc<AppState> {
    Arc::new(AppState::new(client, provider, model))
}
