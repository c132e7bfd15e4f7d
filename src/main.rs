//! VoicePair AI Service
//!
//! 使用 axum 框架构建的 AI 服务，将开发者的问题描述和代码转发给生成式模型，
//! 并把模型回答整理为结构化 JSON（摘要，或建议 + 说明）。

use anyhow::Context;
use axum::{http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod error;
mod llm;
mod models;
mod services;
mod state;
mod utils;

use api::create_api_routes;
use config::AppConfig;
use llm::{LlmClient, ModelClient};
use state::create_shared_state;
use utils::RequestLogger;

#[tokio::main]
async fn main() {
    // 读取 .env（不存在时忽略）
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_service=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!("AI service failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting VoicePair AI Service...");

    // 缺少凭据时在绑定端口前退出
    let config = AppConfig::from_env()?;
    let client = build_model_client(&config)?;

    let state = create_shared_state(client, config.provider.as_str(), config.model.clone());
    let app = build_app(create_api_routes(state), &config.allowed_origins);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on: {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("AI service stopped");
    Ok(())
}

/// 构建模型客户端，启动后只读
fn build_model_client(config: &AppConfig) -> anyhow::Result<Arc<dyn ModelClient>> {
    let mut client = LlmClient::new(
        &config.api_key,
        &config.base_url,
        &config.model,
        config.provider,
        config.generation_options(),
    )?;

    if let Some(dir) = &config.request_log_dir {
        let logger = RequestLogger::new(dir)
            .with_context(|| format!("failed to create request log dir {}", dir.display()))?;
        info!("Model requests are logged to {}", logger.log_path().display());
        client = client.with_logger(Arc::new(logger));
    }

    info!(
        "Model client ready: provider={}, model={}",
        client.format(),
        client.model()
    );

    Ok(Arc::new(client))
}

/// 挂载 CORS 与请求追踪中间件
fn build_app(router: Router, allowed_origins: &[String]) -> Router {
    router
        .layer(build_cors(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// 只允许白名单来源，来源内放开所有方法和请求头
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // 携带凭据时不能使用通配符，改为回显请求的方法和头
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
