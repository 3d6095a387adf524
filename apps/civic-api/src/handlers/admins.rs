//! 管理员管理 handlers（owner 专用）
//!
//! - GET /admins - 管理员列表
//! - POST /admins - 创建管理员
//! - GET /admins/{id} - 管理员详情（含指派区域与模块授权）
//! - PUT /admins/{id} - 更新资料
//! - DELETE /admins/{id} - 删除
//! - PUT /admins/{id}/region - 指派/清除负责区域
//! - PUT /admins/{id}/permissions - 覆盖模块授权
//!
//! 指派区域时校验不变式：payload 声明的层级必须等于被引用区域
//! 节点的实际层级。

use crate::AppState;
use crate::middleware::{require_principal, require_role};
use crate::utils::response::{
    admin_to_dto, bad_request_error, internal_auth_error, not_found_error, storage_error,
};
use crate::utils::{normalize_required, now_ms, parse_access};
use api_contract::{
    AdminDto, ApiResponse, AssignRegionRequest, CreateAdminRequest, GrantsDto, ModuleGrantDto,
    UpdateAdminRequest, UpdatePermissionsRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_auth::hash_password;
use civic_storage::{AdminUpdate, UserRecord};
use domain::{AdminGrants, AssignedRegion, ModuleGrant, RegionLevel, RoleKind};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct AdminPath {
    pub admin_id: String,
}

/// 管理员列表
pub async fn list_admins(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    match state.user_store.list_admins().await {
        Ok(admins) => {
            let data: Vec<AdminDto> = admins.into_iter().map(admin_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 管理员详情
pub async fn get_admin(
    State(state): State<AppState>,
    Path(path): Path<AdminPath>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    match state.user_store.find_admin(&path.admin_id).await {
        Ok(Some(admin)) => {
            (StatusCode::OK, Json(ApiResponse::success(admin_to_dto(admin)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 创建管理员
pub async fn create_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateAdminRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let phone = match normalize_required(req.phone, "phone") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let password = match normalize_required(req.password, "password") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let alias = match normalize_required(req.alias, "alias") {
        Ok(value) => value,
        Err(response) => return response,
    };

    match state.user_store.find_by_phone(&phone).await {
        Ok(Some(_)) => return bad_request_error("phone already registered"),
        Ok(None) => {}
        Err(err) => return storage_error(err),
    }
    let password_hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => return internal_auth_error(err),
    };

    let record = UserRecord {
        user_id: Uuid::new_v4().to_string(),
        phone,
        password_hash,
        first_name: req.first_name.unwrap_or_default(),
        last_name: req.last_name.unwrap_or_default(),
        alias,
        role: RoleKind::Admin,
        is_active: true,
        assigned_region: None,
        grants: None,
        address: None,
        created_at_ms: now_ms(),
    };
    match state.user_store.create_user(record).await {
        Ok(admin) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(admin_to_dto(admin))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 更新管理员资料
pub async fn update_admin(
    State(state): State<AppState>,
    Path(path): Path<AdminPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateAdminRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let password_hash = match req.password {
        Some(password) if !password.trim().is_empty() => match hash_password(password.trim()) {
            Ok(hash) => Some(hash),
            Err(err) => return internal_auth_error(err),
        },
        _ => None,
    };
    let update = AdminUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
        alias: req.alias,
        is_active: req.is_active,
        password_hash,
    };
    match state.user_store.update_admin(&path.admin_id, update).await {
        Ok(Some(admin)) => {
            (StatusCode::OK, Json(ApiResponse::success(admin_to_dto(admin)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除管理员
pub async fn delete_admin(
    State(state): State<AppState>,
    Path(path): Path<AdminPath>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    match state.user_store.delete_admin(&path.admin_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 指派/清除负责区域
pub async fn set_admin_region(
    State(state): State<AppState>,
    Path(path): Path<AdminPath>,
    headers: HeaderMap,
    Json(req): Json<AssignRegionRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }

    let assigned = match req.assigned_region {
        None => None,
        Some(dto) => {
            let level = match RegionLevel::parse(&dto.level) {
                Some(level) => level,
                None => return bad_request_error(format!("invalid region level: {}", dto.level)),
            };
            // 不变式：声明层级必须等于节点实际层级
            let node = match state.region_store.find_region(&dto.region).await {
                Ok(Some(node)) => node,
                Ok(None) => return bad_request_error("assigned region not found"),
                Err(err) => return storage_error(err),
            };
            if node.level != level {
                return bad_request_error("assigned level does not match region node");
            }
            Some(AssignedRegion {
                region: dto.region,
                level,
            })
        }
    };

    match state
        .user_store
        .set_assigned_region(&path.admin_id, assigned)
        .await
    {
        Ok(Some(admin)) => {
            (StatusCode::OK, Json(ApiResponse::success(admin_to_dto(admin)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

fn grant_from_dto(dto: ModuleGrantDto) -> Result<ModuleGrant, Response> {
    Ok(ModuleGrant {
        access: parse_access(&dto.access)?,
        allowed: dto.allowed,
    })
}

fn grants_from_dto(dto: GrantsDto) -> Result<AdminGrants, Response> {
    Ok(AdminGrants {
        requests: dto.requests.map(grant_from_dto).transpose()?,
        services: dto.services.map(grant_from_dto).transpose()?,
        msk: dto.msk.map(grant_from_dto).transpose()?,
    })
}

/// 覆盖模块授权
pub async fn set_admin_permissions(
    State(state): State<AppState>,
    Path(path): Path<AdminPath>,
    headers: HeaderMap,
    Json(req): Json<UpdatePermissionsRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let grants = match grants_from_dto(req.permissions) {
        Ok(grants) => grants,
        Err(response) => return response,
    };
    match state.user_store.set_grants(&path.admin_id, grants).await {
        Ok(Some(admin)) => {
            (StatusCode::OK, Json(ApiResponse::success(admin_to_dto(admin)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};

    #[tokio::test]
    async fn admin_routes_require_owner_role() {
        let state = test_state().await;
        let headers = login_headers("admin-1");
        let response = list_admins(State(state), headers).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn assigned_level_must_match_node_level() {
        let state = test_state().await;
        let headers = login_headers("owner-1");
        // d-1 是 district 节点，声明成 region 层级必须被拒。
        let response = set_admin_region(
            State(state.clone()),
            Path(AdminPath {
                admin_id: "admin-1".to_string(),
            }),
            headers,
            Json(api_contract::AssignRegionRequest {
                assigned_region: Some(api_contract::AssignedRegionDto {
                    region: "d-1".to_string(),
                    level: "region".to_string(),
                }),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let headers = login_headers("owner-1");
        let response = set_admin_region(
            State(state),
            Path(AdminPath {
                admin_id: "admin-1".to_string(),
            }),
            headers,
            Json(api_contract::AssignRegionRequest {
                assigned_region: Some(api_contract::AssignedRegionDto {
                    region: "d-1".to_string(),
                    level: "district".to_string(),
                }),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
