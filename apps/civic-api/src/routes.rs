//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查：/health
//! - 认证接口：/auth/*
//! - 用户自助：/users/*
//! - 区域树：/regions/*
//! - 子类型目录：/request-types、/services、/msk/categories
//! - 诉求工单：/requests/*
//! - 服务报修：/service-reports/*
//! - 社区服务订单：/msk/orders/*
//! - 管理员管理：/admins/*（owner 专用）
//! - 统计：/stats/*
//! - 流量计数：/metrics

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，支持 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/users/me", get(get_profile).put(update_profile))
        .route("/users/region", put(set_region))
        .route("/regions", get(list_regions).post(create_region))
        .route(
            "/regions/:region_id",
            get(get_region).put(update_region).delete(delete_region),
        )
        .route(
            "/request-types",
            get(list_request_types).post(create_request_type),
        )
        .route(
            "/request-types/:item_id",
            put(update_request_type).delete(delete_request_type),
        )
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/:item_id",
            put(update_service).delete(delete_service),
        )
        .route(
            "/msk/categories",
            get(list_msk_categories).post(create_msk_category),
        )
        .route(
            "/msk/categories/:item_id",
            put(update_msk_category).delete(delete_msk_category),
        )
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/my", get(my_requests))
        .route("/requests/stats", get(request_stats))
        .route("/requests/:request_id", put(update_request))
        .route("/requests/:request_id/cancel", put(cancel_request))
        .route("/requests/:request_id/status", put(update_request_status))
        .route("/service-reports", get(list_reports).post(create_report))
        .route("/service-reports/my", get(my_reports))
        .route("/service-reports/stats", get(service_stats))
        .route("/service-reports/:report_id/status", put(update_report_status))
        .route("/service-reports/:report_id/confirm", put(confirm_report))
        .route("/service-reports/:report_id/cancel", put(cancel_report))
        .route("/msk/orders", get(list_orders).post(create_order))
        .route("/msk/orders/my", get(my_orders))
        .route("/msk/orders/:order_id", put(update_order))
        .route("/msk/orders/:order_id/status", put(update_order_status))
        .route("/msk/orders/:order_id/confirm", put(confirm_order))
        .route("/msk/orders/:order_id/cancel", put(cancel_order))
        .route("/admins", get(list_admins).post(create_admin))
        .route(
            "/admins/:admin_id",
            get(get_admin).put(update_admin).delete(delete_admin),
        )
        .route("/admins/:admin_id/region", put(set_admin_region))
        .route("/admins/:admin_id/permissions", put(set_admin_permissions))
        .route("/stats/dashboard", get(dashboard))
        .route("/stats/by-region", get(stats_by_region))
        .route("/metrics", get(get_metrics))
}
