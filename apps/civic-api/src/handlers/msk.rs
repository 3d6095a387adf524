//! 社区服务订单 handlers
//!
//! 用户侧：
//! - POST /msk/orders - 下单（地址快照取自用户档案）
//! - GET /msk/orders/my - 自己的订单
//! - PUT /msk/orders/{id} - 内容编辑（仅 pending）
//! - PUT /msk/orders/{id}/confirm - 接受 / 退回复审
//! - PUT /msk/orders/{id}/cancel - 取消（待确认后不可取消）
//!
//! 管理侧（模块 msk）：
//! - GET /msk/orders - 分页列表（read）
//! - PUT /msk/orders/{id}/status - 状态迁移（manage）

use crate::AppState;
use crate::middleware::{
    require_module, require_principal, require_region_access, require_role,
};
use crate::utils::response::{
    bad_request_error, lifecycle_error, not_found_error, order_to_dto, storage_error,
};
use crate::utils::{normalize_required, now_ms};
use api_contract::{
    ApiResponse, CancelTicketRequest, ConfirmTicketRequest, CreateMskOrderRequest, MskOrderDto,
    OrderListQuery, Paginated, UpdateMskOrderRequest, UpdateOrderStatusRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{MskOrderRecord, OrderContentUpdate, OrderQuery, OrderStatusChange};
use civic_telemetry::{
    record_cancellation, record_confirmation, record_ticket_created, record_transition_applied,
    record_transition_rejected,
};
use civic_workflow::MSK_ORDER;
use domain::{Module, MskOrderStatus, RequiredAccess, RoleKind, scope_filter};
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct OrderPath {
    pub order_id: String,
}

/// 下单
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMskOrderRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let category_id = match normalize_required(req.category_id, "categoryId") {
        Ok(value) => value,
        Err(response) => return response,
    };
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

    let record = MskOrderRecord {
        order_id: Uuid::new_v4().to_string(),
        category_id,
        user_id: user.user_id.clone(),
        description,
        contact_first_name,
        contact_last_name,
        contact_phone,
        status: MSK_ORDER.initial,
        rejection_reason: String::new(),
        cancel_reason: String::new(),
        assigned_admin: None,
        confirmed_by_user: None,
        address,
        created_at_ms: now_ms(),
    };
    match state.msk_order_store.create_order(record).await {
        Ok(order) => {
            record_ticket_created();
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(order_to_dto(order))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 自己的订单列表
pub async fn my_orders(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    match state.msk_order_store.list_owned_orders(&user.user_id).await {
        Ok(orders) => {
            let data: Vec<MskOrderDto> = orders.into_iter().map(order_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 内容编辑（仅初始状态）
pub async fn update_order(
    State(state): State<AppState>,
    Path(path): Path<OrderPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateMskOrderRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let order = match state
        .msk_order_store
        .find_owned_order(&path.order_id, &user.user_id)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    if let Err(err) = MSK_ORDER.ensure_editable(order.status) {
        return lifecycle_error(err);
    }
    let update = OrderContentUpdate {
        description: req.description,
        contact_first_name: req.contact_first_name,
        contact_last_name: req.contact_last_name,
        contact_phone: req.contact_phone,
    };
    match state
        .msk_order_store
        .update_order_content(&path.order_id, &user.user_id, update)
        .await
    {
        Ok(Some(order)) => (
            StatusCode::OK,
            Json(ApiResponse::success(order_to_dto(order))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 管理侧分页列表
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
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
    let allowed = match require_module(&user, Module::Msk, RequiredAccess::Read) {
        Ok(allowed) => allowed,
        Err(response) => return response,
    };
    let status = match query.status.as_deref() {
        Some(value) => match MskOrderStatus::parse(value) {
            Some(status) => Some(status),
            None => return bad_request_error(format!("invalid status: {value}")),
        },
        None => None,
    };
    let scope = scope_filter(&user.to_principal(), query.region_id.as_deref());
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let store_query = OrderQuery {
        status,
        category_id: query.category_id,
        scope,
        allowed,
        page,
        limit,
    };
    match state.msk_order_store.list_orders(&store_query).await {
        Ok((orders, total)) => {
            let data: Vec<MskOrderDto> = orders.into_iter().map(order_to_dto).collect();
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
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(path): Path<OrderPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    if let Err(response) = require_module(&user, Module::Msk, RequiredAccess::Manage) {
        return response;
    }
    let target = match MskOrderStatus::parse(&req.status) {
        Some(status) => status,
        None => return bad_request_error(format!("invalid status: {}", req.status)),
    };
    let order = match state.msk_order_store.find_order(&path.order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };

    let transition =
        match MSK_ORDER.admin_transition(order.status, target, req.rejection_reason.as_deref()) {
            Ok(transition) => transition,
            Err(err) => {
                record_transition_rejected();
                return lifecycle_error(err);
            }
        };

    let change = OrderStatusChange {
        assigned_admin: transition.assign_admin.then(|| user.user_id.clone()),
        rejection_reason: req
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        ..OrderStatusChange::to(transition.to)
    };
    match state
        .msk_order_store
        .apply_order_change(&path.order_id, order.status, change)
        .await
    {
        Ok(Some(order)) => {
            record_transition_applied();
            (
                StatusCode::OK,
                Json(ApiResponse::success(order_to_dto(order))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 用户确认：接受即完成，不接受退回复审
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(path): Path<OrderPath>,
    headers: HeaderMap,
    Json(req): Json<ConfirmTicketRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let order = match state
        .msk_order_store
        .find_owned_order(&path.order_id, &user.user_id)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let next = match MSK_ORDER.user_confirm(order.status, req.confirmed) {
        Ok(status) => status,
        Err(err) => {
            record_transition_rejected();
            return lifecycle_error(err);
        }
    };
    let change = OrderStatusChange {
        confirmed_by_user: Some(req.confirmed),
        ..OrderStatusChange::to(next)
    };
    match state
        .msk_order_store
        .apply_order_change(&path.order_id, order.status, change)
        .await
    {
        Ok(Some(order)) => {
            record_confirmation();
            (
                StatusCode::OK,
                Json(ApiResponse::success(order_to_dto(order))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 用户取消
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(path): Path<OrderPath>,
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
    let order = match state
        .msk_order_store
        .find_owned_order(&path.order_id, &user.user_id)
        .await
    {
        Ok(Some(order)) => order,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let cancelled = match MSK_ORDER.user_cancel(order.status) {
        Ok(status) => status,
        Err(err) => {
            record_transition_rejected();
            return lifecycle_error(err);
        }
    };
    let change = OrderStatusChange {
        cancel_reason: req
            .cancel_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        ..OrderStatusChange::to(cancelled)
    };
    match state
        .msk_order_store
        .apply_order_change(&path.order_id, order.status, change)
        .await
    {
        Ok(Some(order)) => {
            record_cancellation();
            (
                StatusCode::OK,
                Json(ApiResponse::success(order_to_dto(order))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};

    async fn submit(state: &AppState) -> String {
        let response = create_order(
            State(state.clone()),
            login_headers("user-1"),
            Json(api_contract::CreateMskOrderRequest {
                category_id: "cat-cleaning".to_string(),
                description: "yard cleanup".to_string(),
                contact_first_name: "A".to_string(),
                contact_last_name: "B".to_string(),
                contact_phone: "+1".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let listed = state
            .msk_order_store
            .list_owned_orders("user-1")
            .await
            .expect("list");
        listed[0].order_id.clone()
    }

    fn status_body(status: &str) -> api_contract::UpdateOrderStatusRequest {
        api_contract::UpdateOrderStatusRequest {
            status: status.to_string(),
            rejection_reason: None,
        }
    }

    #[tokio::test]
    async fn pending_confirmation_blocks_user_cancel() {
        let state = test_state().await;
        let order_id = submit(&state).await;
        let response = update_order_status(
            State(state.clone()),
            Path(OrderPath {
                order_id: order_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("pending_confirmation")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = cancel_order(
            State(state),
            Path(OrderPath { order_id }),
            login_headers("user-1"),
            Json(api_contract::CancelTicketRequest {
                cancel_reason: Some("changed my mind".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn declined_confirmation_returns_to_review() {
        let state = test_state().await;
        let order_id = submit(&state).await;
        update_order_status(
            State(state.clone()),
            Path(OrderPath {
                order_id: order_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("pending_confirmation")),
        )
        .await;

        let response = confirm_order(
            State(state.clone()),
            Path(OrderPath {
                order_id: order_id.clone(),
            }),
            login_headers("user-1"),
            Json(api_contract::ConfirmTicketRequest { confirmed: false }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let order = state
            .msk_order_store
            .find_order(&order_id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.status, MskOrderStatus::InReview);
        assert_eq!(order.confirmed_by_user, Some(false));
    }

    #[tokio::test]
    async fn review_assigns_admin_and_can_return_to_pending() {
        let state = test_state().await;
        let order_id = submit(&state).await;
        update_order_status(
            State(state.clone()),
            Path(OrderPath {
                order_id: order_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("in_review")),
        )
        .await;

        let order = state
            .msk_order_store
            .find_order(&order_id)
            .await
            .expect("find")
            .expect("order");
        assert_eq!(order.status, MskOrderStatus::InReview);
        assert_eq!(order.assigned_admin.as_deref(), Some("admin-1"));

        let response = update_order_status(
            State(state),
            Path(OrderPath { order_id }),
            login_headers("admin-1"),
            Json(status_body("pending")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
