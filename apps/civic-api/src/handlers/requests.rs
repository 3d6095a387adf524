//! 诉求工单 handlers
//!
//! 用户侧：
//! - POST /requests - 提交（地址快照取自用户档案）
//! - GET /requests/my - 自己的工单
//! - PUT /requests/{id} - 内容编辑（仅 pending）
//! - PUT /requests/{id}/cancel - 取消
//!
//! 管理侧（模块 requests）：
//! - GET /requests - 分页列表（read）
//! - GET /requests/stats - 状态统计（read）
//! - PUT /requests/{id}/status - 状态迁移（manage）

use crate::AppState;
use crate::middleware::{
    require_module, require_principal, require_region_access, require_role,
};
use crate::utils::response::{
    bad_request_error, lifecycle_error, not_found_error, request_to_dto, storage_error,
};
use crate::utils::{normalize_required, now_ms};
use api_contract::{
    ApiResponse, CancelTicketRequest, CreateRequestRequest, Paginated, RequestDto,
    RequestListQuery, StatsScopeQuery, StatusCounts, UpdateRequestRequest,
    UpdateRequestStatusRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{
    RequestContentUpdate, RequestQuery, RequestRecord, RequestStatusChange,
};
use civic_telemetry::{
    record_cancellation, record_ticket_created, record_transition_applied,
    record_transition_rejected,
};
use civic_workflow::REQUEST;
use domain::{Module, RequestStatus, RequiredAccess, RoleKind, scope_filter};
use uuid::Uuid;

/// 诉求类别固定集合。
const REQUEST_CATEGORIES: [&str; 3] = ["infrastructure", "social", "finance"];

#[derive(serde::Deserialize)]
pub struct RequestPath {
    pub request_id: String,
}

/// 提交诉求工单
pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateRequestRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let category = match normalize_required(req.category, "category") {
        Ok(value) => value,
        Err(response) => return response,
    };
    if !REQUEST_CATEGORIES.contains(&category.as_str()) {
        return bad_request_error(format!("invalid category: {category}"));
    }
    let description = match normalize_required(req.description, "description") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let contact_first_name = match normalize_required(req.contact_first_name, "contactFirstName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let contact_last_name = match normalize_required(req.contact_last_name, "contactLastName") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let contact_phone = match normalize_required(req.contact_phone, "contactPhone") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let Some(address) = user.address.clone() else {
        return bad_request_error("address must be set first");
    };

    let record = RequestRecord {
        request_id: Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        category,
        type_id: None,
        description,
        contact_first_name,
        contact_last_name,
        contact_phone,
        status: REQUEST.initial,
        rejection_reason: String::new(),
        closing_note: String::new(),
        cancel_reason: String::new(),
        assigned_admin: None,
        address,
        created_at_ms: now_ms(),
    };
    match state.request_store.create_request(record).await {
        Ok(request) => {
            record_ticket_created();
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(request_to_dto(request))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 自己的工单列表
pub async fn my_requests(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    match state.request_store.list_owned_requests(&user.user_id).await {
        Ok(requests) => {
            let data: Vec<RequestDto> = requests.into_iter().map(request_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 内容编辑（仅初始状态）
pub async fn update_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequestRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let request = match state
        .request_store
        .find_owned_request(&path.request_id, &user.user_id)
        .await
    {
        Ok(Some(request)) => request,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    if let Err(err) = REQUEST.ensure_editable(request.status) {
        return lifecycle_error(err);
    }
    if let Some(category) = &req.category {
        if !REQUEST_CATEGORIES.contains(&category.as_str()) {
            return bad_request_error(format!("invalid category: {category}"));
        }
    }
    let update = RequestContentUpdate {
        category: req.category,
        description: req.description,
        contact_first_name: req.contact_first_name,
        contact_last_name: req.contact_last_name,
        contact_phone: req.contact_phone,
    };
    match state
        .request_store
        .update_request_content(&path.request_id, &user.user_id, update)
        .await
    {
        Ok(Some(request)) => (
            StatusCode::OK,
            Json(ApiResponse::success(request_to_dto(request))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 用户取消
pub async fn cancel_request(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    headers: HeaderMap,
    Json(req): Json<CancelTicketRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let request = match state
        .request_store
        .find_owned_request(&path.request_id, &user.user_id)
        .await
    {
        Ok(Some(request)) => request,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let cancelled = match REQUEST.user_cancel(request.status) {
        Ok(status) => status,
        Err(err) => {
            record_transition_rejected();
            return lifecycle_error(err);
        }
    };
    let change = RequestStatusChange {
        cancel_reason: req
            .cancel_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        ..RequestStatusChange::to(cancelled)
    };
    match state
        .request_store
        .apply_request_change(&path.request_id, request.status, change)
        .await
    {
        Ok(Some(request)) => {
            record_cancellation();
            (
                StatusCode::OK,
                Json(ApiResponse::success(request_to_dto(request))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 管理侧分页列表
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    if let Err(response) = require_region_access(&user, query.region_id.as_deref()) {
        return response;
    }
    let allowed = match require_module(&user, Module::Requests, RequiredAccess::Read) {
        Ok(allowed) => allowed,
        Err(response) => return response,
    };
    let status = match query.status.as_deref() {
        Some(value) => match RequestStatus::parse(value) {
            Some(status) => Some(status),
            None => return bad_request_error(format!("invalid status: {value}")),
        },
        None => None,
    };
    let scope = scope_filter(&user.to_principal(), query.region_id.as_deref());
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let store_query = RequestQuery {
        status,
        category: query.category,
        type_id: query.type_id,
        scope,
        allowed,
        page,
        limit,
    };
    match state.request_store.list_requests(&store_query).await {
        Ok((requests, total)) => {
            let data: Vec<RequestDto> = requests.into_iter().map(request_to_dto).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(Paginated::new(data, total, page, limit))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 管理侧状态迁移
pub async fn update_request_status(
    State(state): State<AppState>,
    Path(path): Path<RequestPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequestStatusRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    if let Err(response) = require_module(&user, Module::Requests, RequiredAccess::Manage) {
        return response;
    }
    let target = match RequestStatus::parse(&req.status) {
        Some(status) => status,
        None => return bad_request_error(format!("invalid status: {}", req.status)),
    };
    let request = match state.request_store.find_request(&path.request_id).await {
        Ok(Some(request)) => request,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };

    let transition =
        match REQUEST.admin_transition(request.status, target, req.rejection_reason.as_deref()) {
            Ok(transition) => transition,
            Err(err) => {
                record_transition_rejected();
                return lifecycle_error(err);
            }
        };

    let change = RequestStatusChange {
        assigned_admin: transition.assign_admin.then(|| user.user_id.clone()),
        rejection_reason: req
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        closing_note: req
            .closing_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
        // 显式 null 清空分类；空串同样视为清空
        type_id: req
            .type_id
            .map(|type_id| type_id.filter(|value| !value.trim().is_empty())),
        ..RequestStatusChange::to(transition.to)
    };
    match state
        .request_store
        .apply_request_change(&path.request_id, request.status, change)
        .await
    {
        Ok(Some(request)) => {
            record_transition_applied();
            (
                StatusCode::OK,
                Json(ApiResponse::success(request_to_dto(request))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 可见范围内的状态统计
pub async fn request_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsScopeQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    if let Err(response) = require_region_access(&user, query.region_id.as_deref()) {
        return response;
    }
    let allowed = match require_module(&user, Module::Requests, RequiredAccess::Read) {
        Ok(allowed) => allowed,
        Err(response) => return response,
    };
    let scope = scope_filter(&user.to_principal(), query.region_id.as_deref());
    match state
        .request_store
        .count_requests_by_status(&scope, &allowed)
        .await
    {
        Ok(counts) => (
            StatusCode::OK,
            Json(ApiResponse::success(StatusCounts::from_counts(counts))),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};
    use civic_storage::UserStore;
    use domain::{AccessLevel, AdminGrants, ModuleGrant};

    async fn submit(state: &AppState) -> String {
        let response = create_request(
            State(state.clone()),
            login_headers("user-1"),
            Json(api_contract::CreateRequestRequest {
                category: "infrastructure".to_string(),
                description: "broken street light".to_string(),
                contact_first_name: "A".to_string(),
                contact_last_name: "B".to_string(),
                contact_phone: "+1".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let listed = state
            .request_store
            .list_owned_requests("user-1")
            .await
            .expect("list");
        listed[0].request_id.clone()
    }

    fn status_body(status: &str) -> api_contract::UpdateRequestStatusRequest {
        api_contract::UpdateRequestStatusRequest {
            status: status.to_string(),
            rejection_reason: None,
            closing_note: None,
            type_id: None,
        }
    }

    #[tokio::test]
    async fn review_then_resolve_assigns_admin() {
        let state = test_state().await;
        let request_id = submit(&state).await;

        let response = update_request_status(
            State(state.clone()),
            Path(RequestPath {
                request_id: request_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("in_review")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = state
            .request_store
            .find_request(&request_id)
            .await
            .expect("find")
            .expect("request");
        assert_eq!(request.status, RequestStatus::InReview);
        assert_eq!(request.assigned_admin.as_deref(), Some("admin-1"));

        // 诉求迁移表不受限，resolved 无需理由。
        let response = update_request_status(
            State(state.clone()),
            Path(RequestPath {
                request_id: request_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("resolved")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejection_requires_reason() {
        let state = test_state().await;
        let request_id = submit(&state).await;
        let response = update_request_status(
            State(state),
            Path(RequestPath { request_id }),
            login_headers("admin-1"),
            Json(status_body("rejected")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn read_only_admin_cannot_manage() {
        let state = test_state().await;
        let request_id = submit(&state).await;
        state
            .user_store
            .set_grants(
                "admin-1",
                AdminGrants {
                    requests: Some(ModuleGrant {
                        access: AccessLevel::Read,
                        allowed: Vec::new(),
                    }),
                    ..AdminGrants::default()
                },
            )
            .await
            .expect("grants")
            .expect("admin");

        let response = update_request_status(
            State(state),
            Path(RequestPath { request_id }),
            login_headers("admin-1"),
            Json(status_body("in_review")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn resolved_request_cannot_be_cancelled() {
        let state = test_state().await;
        let request_id = submit(&state).await;
        update_request_status(
            State(state.clone()),
            Path(RequestPath {
                request_id: request_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("resolved")),
        )
        .await;

        let response = cancel_request(
            State(state),
            Path(RequestPath { request_id }),
            login_headers("user-1"),
            Json(api_contract::CancelTicketRequest {
                cancel_reason: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_cannot_override_foreign_region() {
        let state = test_state().await;
        // admin-1 未被指派任何区域：显式 regionId 一律拒绝。
        let response = list_requests(
            State(state),
            Query(api_contract::RequestListQuery {
                status: None,
                category: None,
                type_id: None,
                region_id: Some("r-1".to_string()),
                page: None,
                limit: None,
            }),
            login_headers("admin-1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
