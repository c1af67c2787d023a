//! 脑图谱知识库服务
//!
//! 提供认知概念与脑结构查询功能，包括：
//! - 共享数据库连接池的生命周期管理（探活与自动重连）
//! - 概念与脑结构检索
//! - 按层级模型重建脑结构的祖先与后代树

mod catalog;
mod credentials;
mod handlers;
mod hierarchy;
mod pool_manager;
mod repository;
mod routes;
mod state;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use handlers::SERVICE_NAME;

const DEFAULT_PORT: u16 = 8000;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Brain Atlas API",
        version = "0.1.0",
        description = "Cognitive concepts and brain structure hierarchies"
    ),
    paths(
        handlers::connect,
        handlers::connection_status,
        handlers::search_concepts,
        handlers::concept_details,
        handlers::search_structures,
        handlers::structure_details,
        handlers::hierarchy_models,
        handlers::health_check,
    ),
    components(schemas(
        common::models::ConnectionParams,
        common::models::ConnectionStatus,
        common::models::ConnectResult,
        common::models::ConceptSummary,
        common::models::ConceptDetails,
        common::models::ConceptClass,
        common::models::ConceptRelationship,
        common::models::StructureNode,
        common::models::StructureDetails,
        common::models::SynonymDetail,
        common::models::HierarchyTree,
        handlers::HealthResponse,
    )),
    tags(
        (name = "connection", description = "Database connection endpoints"),
        (name = "concepts", description = "Cognitive concept endpoints"),
        (name = "structures", description = "Brain structure endpoints"),
        (name = "health", description = "Health check endpoint")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 优先加载
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let mut config = AppConfig::load_with_service(SERVICE_NAME);
    if config.port == 0 {
        config.port = DEFAULT_PORT;
    }

    // 连接池在首次 /api/connect 时建立
    let state = AppState::new(config.clone());
    let pool_manager = state.pool_manager.clone();

    let app = create_router(state);

    let addr = config.bind_address();
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool_manager.release_all().await;
    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }
}
