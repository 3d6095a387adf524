//! 子类型目录 handlers
//!
//! 诉求类型 / 服务 / 社区服务类目共用一套实现，按 CatalogKind 分流：
//! - GET /request-types | /services | /msk/categories - 启用条目（公开）
//! - POST ... - 创建（owner；同名拒绝）
//! - PUT .../{id} - 更新
//! - DELETE .../{id} - 删除

use crate::AppState;
use crate::middleware::{require_principal, require_role};
use crate::utils::response::{bad_request_error, catalog_to_dto, not_found_error, storage_error};
use crate::utils::{normalize_optional, normalize_required};
use api_contract::{
    ApiResponse, CatalogItemDto, CreateCatalogItemRequest, UpdateCatalogItemRequest,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{CatalogKind, CatalogRecord, CatalogUpdate};
use domain::RoleKind;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct CatalogPath {
    pub item_id: String,
}

async fn list_catalog(state: &AppState, kind: CatalogKind) -> Response {
    match state.catalog_store.list_active(kind).await {
        Ok(items) => {
            let data: Vec<CatalogItemDto> = items.into_iter().map(catalog_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

async fn create_catalog_item(
    state: &AppState,
    headers: &HeaderMap,
    kind: CatalogKind,
    req: CreateCatalogItemRequest,
) -> Response {
    let user = match require_principal(state, headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let name = match normalize_required(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    match state.catalog_store.find_by_name(kind, &name).await {
        Ok(Some(_)) => return bad_request_error("item already exists"),
        Ok(None) => {}
        Err(err) => return storage_error(err),
    }
    let record = CatalogRecord {
        item_id: Uuid::new_v4().to_string(),
        kind,
        name,
        icon: req.icon.unwrap_or_default(),
        is_active: true,
    };
    match state.catalog_store.create_item(record).await {
        Ok(item) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(catalog_to_dto(item))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

async fn update_catalog_item(
    state: &AppState,
    headers: &HeaderMap,
    kind: CatalogKind,
    item_id: &str,
    req: UpdateCatalogItemRequest,
) -> Response {
    let user = match require_principal(state, headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let name = match normalize_optional(req.name, "name") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let update = CatalogUpdate {
        name,
        icon: req.icon,
        is_active: req.is_active,
    };
    match state.catalog_store.update_item(kind, item_id, update).await {
        Ok(Some(item)) => (
            StatusCode::OK,
            Json(ApiResponse::success(catalog_to_dto(item))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

async fn delete_catalog_item(
    state: &AppState,
    headers: &HeaderMap,
    kind: CatalogKind,
    item_id: &str,
) -> Response {
    let user = match require_principal(state, headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    match state.catalog_store.delete_item(kind, item_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

// ---- 诉求类型 ----

pub async fn list_request_types(State(state): State<AppState>) -> Response {
    list_catalog(&state, CatalogKind::RequestType).await
}

pub async fn create_request_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCatalogItemRequest>,
) -> Response {
    create_catalog_item(&state, &headers, CatalogKind::RequestType, req).await
}

pub async fn update_request_type(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateCatalogItemRequest>,
) -> Response {
    update_catalog_item(&state, &headers, CatalogKind::RequestType, &path.item_id, req).await
}

pub async fn delete_request_type(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
) -> Response {
    delete_catalog_item(&state, &headers, CatalogKind::RequestType, &path.item_id).await
}

// ---- 服务 ----

pub async fn list_services(State(state): State<AppState>) -> Response {
    list_catalog(&state, CatalogKind::Service).await
}

pub async fn create_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCatalogItemRequest>,
) -> Response {
    create_catalog_item(&state, &headers, CatalogKind::Service, req).await
}

pub async fn update_service(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateCatalogItemRequest>,
) -> Response {
    update_catalog_item(&state, &headers, CatalogKind::Service, &path.item_id, req).await
}

pub async fn delete_service(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
) -> Response {
    delete_catalog_item(&state, &headers, CatalogKind::Service, &path.item_id).await
}

// ---- 社区服务类目 ----

pub async fn list_msk_categories(State(state): State<AppState>) -> Response {
    list_catalog(&state, CatalogKind::MskCategory).await
}

pub async fn create_msk_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCatalogItemRequest>,
) -> Response {
    create_catalog_item(&state, &headers, CatalogKind::MskCategory, req).await
}

pub async fn update_msk_category(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateCatalogItemRequest>,
) -> Response {
    update_catalog_item(&state, &headers, CatalogKind::MskCategory, &path.item_id, req).await
}

pub async fn delete_msk_category(
    State(state): State<AppState>,
    Path(path): Path<CatalogPath>,
    headers: HeaderMap,
) -> Response {
    delete_catalog_item(&state, &headers, CatalogKind::MskCategory, &path.item_id).await
}
