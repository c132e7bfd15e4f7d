//! 摘要与建议端点

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::{SuggestRequest, SuggestResponse, SummarizeRequest, SummarizeResponse};
use crate::state::AppState;

/// 生成摘要
async fn summarize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> AppResult<Json<SummarizeResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.assist.summarize(req).await?))
}

/// 生成建议或解释
async fn suggest(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> AppResult<Json<SuggestResponse>> {
    let Json(req) = payload?;
    Ok(Json(state.assist.suggest(req).await?))
}

/// 创建摘要与建议路由
pub fn assist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summarize/", post(summarize))
        .route("/summarize", post(summarize))
        .route("/suggest/", post(suggest))
        .route("/suggest", post(suggest))
}
