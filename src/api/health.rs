//! 存活检查端点

use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

use crate::models::{HealthResponse, RootResponse};
use crate::state::AppState;

/// 根路径
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "VoicePair AI Service is running!".to_string(),
    })
}

/// 健康检查处理器
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: state.provider.clone(),
        model: state.model.clone(),
    })
}

/// 创建健康检查路由
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
}
