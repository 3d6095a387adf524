//! 认证和授权中间件
//!
//! 提供以下中间件和辅助函数：
//! - request_context：请求上下文中间件，注入 request_id/trace_id
//! - bearer_token：从 Authorization 头提取 Bearer token
//! - require_principal：验证 token 并每请求重载用户记录
//! - require_role：角色白名单校验
//! - require_module：模块权限评估，通过后返回子类型白名单
//! - require_region_access：显式 regionId 的区域访问门卫
//!
//! 认证流程：
//! 1. request_context：在所有请求前注入追踪 ID
//! 2. bearer_token：从请求头提取 token
//! 3. require_principal：验证 JWT 签名，按 sub 重新加载用户
//! 4. require_module / require_region_access：按路由粒度叠加

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use civic_auth::AuthError;
use civic_storage::UserRecord;
use civic_telemetry::new_request_ids;
use domain::{AllowList, Module, RequiredAccess, RoleKind, evaluate};
use tracing::{Instrument, info_span};

use crate::AppState;
use crate::utils::response::{
    auth_error, forbidden_error, internal_auth_error, module_disabled_error, read_only_error,
    region_forbidden_error, storage_error,
};

/// 请求上下文中间件：注入 request_id/trace_id
pub async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response: axum::response::Response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}

/// 从请求头中提取 Bearer token
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header_value = headers.get(header::AUTHORIZATION)?;
    let auth_str = header_value.to_str().ok()?;
    auth_str.strip_prefix("Bearer ")
}

/// 验证 token 并重载用户记录
///
/// 每请求从存储重新加载，保证权限/区域指派的修改即时生效；
/// 停用账户一律 401。
pub async fn require_principal(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<UserRecord, Response> {
    let token = match bearer_token(headers) {
        Some(token) => token,
        None => return Err(auth_error(axum::http::StatusCode::UNAUTHORIZED)),
    };
    let user_id = match state.auth.verify_token(token) {
        Ok(user_id) => user_id,
        Err(AuthError::TokenInvalid | AuthError::TokenExpired) => {
            return Err(auth_error(axum::http::StatusCode::UNAUTHORIZED));
        }
        Err(err) => return Err(internal_auth_error(err)),
    };
    let user = match state.user_store.find_by_id(&user_id).await {
        Ok(user) => user,
        Err(err) => return Err(storage_error(err)),
    };
    match user {
        Some(user) if user.is_active => Ok(user),
        _ => Err(auth_error(axum::http::StatusCode::UNAUTHORIZED)),
    }
}

/// 角色白名单校验
pub fn require_role(user: &UserRecord, roles: &[RoleKind]) -> Result<(), Response> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(forbidden_error())
    }
}

/// 模块权限评估，通过后返回该模块的子类型白名单
pub fn require_module(
    user: &UserRecord,
    module: Module,
    required: RequiredAccess,
) -> Result<AllowList, Response> {
    use domain::PermissionError;

    evaluate(&user.to_principal(), module, required).map_err(|err| match err {
        PermissionError::ForbiddenRole => forbidden_error(),
        PermissionError::ModuleDisabled => module_disabled_error(),
        PermissionError::ReadOnly => read_only_error(),
    })
}

/// 显式 regionId 的区域访问门卫
///
/// owner 直通；管理员仅可钻取自己被指派的区域；未带 regionId 时
/// 直接放行（交给 scope_filter 落回本区域谓词）。
pub fn require_region_access(
    user: &UserRecord,
    explicit_region: Option<&str>,
) -> Result<(), Response> {
    if user.role == RoleKind::Owner {
        return Ok(());
    }
    if user.role != RoleKind::Admin {
        return Err(forbidden_error());
    }
    let Some(region_id) = explicit_region else {
        return Ok(());
    };
    let matches = user
        .assigned_region
        .as_ref()
        .is_some_and(|assigned| assigned.region == region_id);
    if matches {
        Ok(())
    } else {
        Err(region_forbidden_error())
    }
}
