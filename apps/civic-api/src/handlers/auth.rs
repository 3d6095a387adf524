//! 认证 handlers
//!
//! - POST /auth/register - 市民注册
//! - POST /auth/login - 市民登录
//! - POST /auth/admin/login - 管理端登录（owner/admin）

use crate::AppState;
use crate::utils::response::{auth_error, bad_request_error, internal_auth_error, user_to_dto};
use crate::utils::{normalize_required, now_ms};
use api_contract::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use civic_auth::AuthError;
use civic_storage::UserRecord;
use domain::RoleKind;
use uuid::Uuid;

/// 健康检查端点
///
/// 无需认证，返回简单的健康状态。可用于负载均衡器健康探针或服务监控。
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// 市民注册
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    let phone = match normalize_required(req.phone, "phone") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let password = match normalize_required(req.password, "password") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let record = UserRecord {
        user_id: Uuid::new_v4().to_string(),
        phone,
        password_hash: String::new(),
        first_name: req.first_name.unwrap_or_default(),
        last_name: String::new(),
        alias: String::new(),
        role: RoleKind::User,
        is_active: true,
        assigned_region: None,
        grants: None,
        address: None,
        created_at_ms: now_ms(),
    };

    match state.auth.register(record, &password).await {
        Ok((user, issued)) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(AuthResponse {
                token: issued.token,
                user: user_to_dto(user),
            })),
        )
            .into_response(),
        Err(AuthError::PhoneTaken) => bad_request_error("phone already registered"),
        Err(err) => internal_auth_error(err),
    }
}

/// 市民登录
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(&req.phone, &req.password).await {
        Ok((user, issued)) => (
            StatusCode::OK,
            Json(ApiResponse::success(AuthResponse {
                token: issued.token,
                user: user_to_dto(user),
            })),
        )
            .into_response(),
        Err(AuthError::InvalidCredentials) => auth_error(StatusCode::UNAUTHORIZED),
        Err(err) => internal_auth_error(err),
    }
}

/// 管理端登录（owner/admin）
pub async fn admin_login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.admin_login(&req.phone, &req.password).await {
        Ok((user, issued)) => (
            StatusCode::OK,
            Json(ApiResponse::success(AuthResponse {
                token: issued.token,
                user: user_to_dto(user),
            })),
        )
            .into_response(),
        Err(AuthError::InvalidCredentials) => auth_error(StatusCode::UNAUTHORIZED),
        Err(err) => internal_auth_error(err),
    }
}
