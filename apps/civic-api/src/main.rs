//! 市民工单服务 HTTP API。
//!
//! 启动流程：加载配置 → 初始化 tracing → 建立 Postgres 连接池 →
//! 装配存储与认证服务 → 挂载路由（同时支持 / 与 /api/ 前缀）。

mod handlers;
mod middleware;
mod routes;
#[cfg(test)]
mod test_support;
mod utils;

use axum::Router;
use civic_auth::{AuthService, JwtManager};
use civic_config::AppConfig;
use civic_storage::{
    CatalogStore, MskOrderStore, PgCatalogStore, PgMskOrderStore, PgRegionStore, PgRequestStore,
    PgServiceReportStore, PgUserStore, RegionStore, RequestStore, ServiceReportStore, UserStore,
    connect_pool,
};
use civic_telemetry::init_tracing;
use std::sync::Arc;

/// 应用共享状态：认证服务 + 各存储接口。
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub user_store: Arc<dyn UserStore>,
    pub region_store: Arc<dyn RegionStore>,
    pub catalog_store: Arc<dyn CatalogStore>,
    pub request_store: Arc<dyn RequestStore>,
    pub service_report_store: Arc<dyn ServiceReportStore>,
    pub msk_order_store: Arc<dyn MskOrderStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    // Postgres 存储（需先执行 migrations/seed）
    let pool = connect_pool(&config.database_url).await?;
    let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_ttl_seconds);
    let auth = Arc::new(AuthService::new(user_store.clone(), jwt));

    let state = AppState {
        auth,
        user_store,
        region_store: Arc::new(PgRegionStore::new(pool.clone())),
        catalog_store: Arc::new(PgCatalogStore::new(pool.clone())),
        request_store: Arc::new(PgRequestStore::new(pool.clone())),
        service_report_store: Arc::new(PgServiceReportStore::new(pool.clone())),
        msk_order_store: Arc::new(PgMskOrderStore::new(pool)),
    };

    let api = routes::create_api_router();
    let app = Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context));

    tracing::info!(addr = %config.http_addr, "civic-api listening");
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
