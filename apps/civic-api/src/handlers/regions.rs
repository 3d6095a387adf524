//! 区域树 handlers
//!
//! - GET /regions - 按层级/父节点列出（公开；level=region 默认取顶层）
//! - GET /regions/{id} - 节点详情
//! - POST /regions - 创建节点（owner/admin；父节点层级必须恰好高一级）
//! - PUT /regions/{id} - 更新名称/启用状态（owner/admin）
//! - DELETE /regions/{id} - 删除（owner；有子节点时拒绝）

use crate::AppState;
use crate::middleware::{require_principal, require_role};
use crate::utils::response::{bad_request_error, not_found_error, region_to_dto, storage_error};
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{
    ApiResponse, CreateRegionRequest, RegionDto, RegionListQuery, UpdateRegionRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{ParentFilter, RegionFilter, RegionRecord, RegionUpdate};
use domain::{RegionLevel, RoleKind};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct RegionPath {
    pub region_id: String,
}

/// 按层级/父节点列出区域
pub async fn list_regions(
    State(state): State<AppState>,
    Query(query): Query<RegionListQuery>,
) -> Response {
    let level = match query.level.as_deref() {
        Some(value) => match RegionLevel::parse(value) {
            Some(level) => Some(level),
            None => return bad_request_error(format!("invalid region level: {value}")),
        },
        None => None,
    };
    // 无父节点参数时，region 层级默认只取顶层
    let parent = match query.parent {
        Some(parent_id) => Some(ParentFilter::Node(parent_id)),
        None if level == Some(RegionLevel::Region) => Some(ParentFilter::Root),
        None => None,
    };
    match state
        .region_store
        .list_regions(RegionFilter { level, parent })
        .await
    {
        Ok(regions) => {
            let data: Vec<RegionDto> = regions.into_iter().map(region_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 节点详情
pub async fn get_region(State(state): State<AppState>, Path(path): Path<RegionPath>) -> Response {
    match state.region_store.find_region(&path.region_id).await {
        Ok(Some(region)) => (
            StatusCode::OK,
            Json(ApiResponse::success(region_to_dto(region))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 创建节点
pub async fn create_region(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRegionRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let level = match RegionLevel::parse(&req.level) {
        Some(level) => level,
        None => return bad_request_error(format!("invalid region level: {}", req.level)),
    };

    // 树形不变式：父节点层级恰好高一级；只有 region 层级允许无父节点
    let parent = match (level.parent(), req.parent) {
        (None, None) => None,
        (None, Some(_)) => return bad_request_error("region level cannot have a parent"),
        (Some(_), None) => return bad_request_error("parent required"),
        (Some(expected), Some(parent_id)) => {
            let parent_node = match state.region_store.find_region(&parent_id).await {
                Ok(Some(node)) => node,
                Ok(None) => return bad_request_error("parent region not found"),
                Err(err) => return storage_error(err),
            };
            if parent_node.level != expected {
                return bad_request_error("parent must be exactly one level above");
            }
            Some(parent_id)
        }
    };

    match state
        .region_store
        .region_exists(&name, level, parent.as_deref())
        .await
    {
        Ok(true) => return bad_request_error("region already exists"),
        Ok(false) => {}
        Err(err) => return storage_error(err),
    }

    let record = RegionRecord {
        region_id: Uuid::new_v4().to_string(),
        name,
        level,
        parent,
        is_active: true,
    };
    match state.region_store.create_region(record).await {
        Ok(region) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(region_to_dto(region))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

/// 更新名称/启用状态
pub async fn update_region(
    State(state): State<AppState>,
    Path(path): Path<RegionPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateRegionRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let update = RegionUpdate {
        name,
        is_active: req.is_active,
    };
    match state.region_store.update_region(&path.region_id, update).await {
        Ok(Some(region)) => (
            StatusCode::OK,
            Json(ApiResponse::success(region_to_dto(region))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 删除节点（有子节点时拒绝）
pub async fn delete_region(
    State(state): State<AppState>,
    Path(path): Path<RegionPath>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    match state.region_store.count_children(&path.region_id).await {
        Ok(0) => {}
        Ok(_) => return bad_request_error("region has child regions"),
        Err(err) => return storage_error(err),
    }
    match state.region_store.delete_region(&path.region_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};

    #[tokio::test]
    async fn create_rejects_wrong_parent_level() {
        let state = test_state().await;
        let headers = login_headers("owner-1");
        // neighborhood 的父节点必须是 district，挂到 region 下被拒。
        let response = create_region(
            State(state),
            headers,
            Json(api_contract::CreateRegionRequest {
                name: "Mahalla".to_string(),
                level: "neighborhood".to_string(),
                parent: Some("r-1".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_refused_while_children_exist() {
        let state = test_state().await;
        let headers = login_headers("owner-1");
        let response = delete_region(
            State(state.clone()),
            Path(RegionPath {
                region_id: "r-1".to_string(),
            }),
            headers,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let headers = login_headers("owner-1");
        let response = delete_region(
            State(state),
            Path(RegionPath {
                region_id: "d-1".to_string(),
            }),
            headers,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
