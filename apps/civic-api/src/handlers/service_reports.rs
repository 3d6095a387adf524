//! 服务报修 handlers
//!
//! 用户侧：
//! - POST /service-reports - 报修（地址快照取自用户档案）
//! - GET /service-reports/my - 自己的报修
//! - PUT /service-reports/{id}/confirm - 确认恢复 / 仍不可用
//! - PUT /service-reports/{id}/cancel - 取消
//!
//! 管理侧（模块 services）：
//! - GET /service-reports - 分页列表（read）
//! - GET /service-reports/stats - 按服务统计（read）
//! - PUT /service-reports/{id}/status - 状态迁移（manage）

use crate::AppState;
use crate::middleware::{
    require_module, require_principal, require_region_access, require_role,
};
use crate::utils::response::{
    bad_request_error, lifecycle_error, not_found_error, report_to_dto, storage_error,
};
use crate::utils::{normalize_required, now_ms};
use api_contract::{
    ApiResponse, CancelTicketRequest, ConfirmTicketRequest, CreateServiceReportRequest, Paginated,
    ReportListQuery, ServiceReportDto, ServiceStatDto, ServiceStatsQuery,
    UpdateReportStatusRequest,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{
    CatalogKind, ReportQuery, ReportStatusChange, ServiceReportRecord, ServiceStatusCount,
};
use civic_telemetry::{
    record_cancellation, record_confirmation, record_ticket_created, record_transition_applied,
    record_transition_rejected,
};
use civic_workflow::SERVICE_REPORT;
use domain::{
    Module, RegionLevel, RegionScope, RequiredAccess, RoleKind, ServiceReportStatus, scope_filter,
};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct ReportPath {
    pub report_id: String,
}

/// 报修
pub async fn create_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateServiceReportRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    let service_id = match normalize_required(req.service_id, "serviceId") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let Some(address) = user.address.clone() else {
        return bad_request_error("address must be set first");
    };

    let record = ServiceReportRecord {
        report_id: Uuid::new_v4().to_string(),
        service_id,
        user_id: user.user_id.clone(),
        status: SERVICE_REPORT.initial,
        resolved_by_admin: None,
        confirmed_by_user: None,
        rejection_reason: String::new(),
        cancel_reason: String::new(),
        admin_note: String::new(),
        address,
        created_at_ms: now_ms(),
    };
    match state.service_report_store.create_report(record).await {
        Ok(report) => {
            record_ticket_created();
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(report_to_dto(report))),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 自己的报修列表
pub async fn my_reports(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::User]) {
        return response;
    }
    match state
        .service_report_store
        .list_owned_reports(&user.user_id)
        .await
    {
        Ok(reports) => {
            let data: Vec<ServiceReportDto> = reports.into_iter().map(report_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 管理侧分页列表
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
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
    let allowed = match require_module(&user, Module::Services, RequiredAccess::Read) {
        Ok(allowed) => allowed,
        Err(response) => return response,
    };
    let status = match query.status.as_deref() {
        Some(value) => match ServiceReportStatus::parse(value) {
            Some(status) => Some(status),
            None => return bad_request_error(format!("invalid status: {value}")),
        },
        None => None,
    };
    let scope = scope_filter(&user.to_principal(), query.region_id.as_deref());
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let store_query = ReportQuery {
        status,
        service_id: query.service_id,
        scope,
        allowed,
        page,
        limit,
    };
    match state.service_report_store.list_reports(&store_query).await {
        Ok((reports, total)) => {
            let data: Vec<ServiceReportDto> = reports.into_iter().map(report_to_dto).collect();
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
///
/// 每次成功迁移都记录处理管理员；rejected 必须附带理由。
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(path): Path<ReportPath>,
    headers: HeaderMap,
    Json(req): Json<UpdateReportStatusRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    if let Err(response) = require_module(&user, Module::Services, RequiredAccess::Manage) {
        return response;
    }
    let target = match ServiceReportStatus::parse(&req.status) {
        Some(status) => status,
        None => return bad_request_error(format!("invalid status: {}", req.status)),
    };
    let report = match state.service_report_store.find_report(&path.report_id).await {
        Ok(Some(report)) => report,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };

    let transition =
        match SERVICE_REPORT.admin_transition(report.status, target, req.rejection_reason.as_deref())
        {
            Ok(transition) => transition,
            Err(err) => {
                record_transition_rejected();
                return lifecycle_error(err);
            }
        };

    let change = ReportStatusChange {
        resolved_by_admin: transition.assign_admin.then(|| user.user_id.clone()),
        rejection_reason: req
            .rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        admin_note: req
            .admin_note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .map(str::to_string),
        ..ReportStatusChange::to(transition.to)
    };
    match state
        .service_report_store
        .apply_report_change(&path.report_id, report.status, change)
        .await
    {
        Ok(Some(report)) => {
            record_transition_applied();
            (
                StatusCode::OK,
                Json(ApiResponse::success(report_to_dto(report))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 用户确认恢复 / 仍不可用
pub async fn confirm_report(
    State(state): State<AppState>,
    Path(path): Path<ReportPath>,
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
    let report = match state
        .service_report_store
        .find_owned_report(&path.report_id, &user.user_id)
        .await
    {
        Ok(Some(report)) => report,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let next = match SERVICE_REPORT.user_confirm(report.status, req.confirmed) {
        Ok(status) => status,
        Err(err) => {
            record_transition_rejected();
            return lifecycle_error(err);
        }
    };
    let change = ReportStatusChange {
        confirmed_by_user: Some(req.confirmed),
        ..ReportStatusChange::to(next)
    };
    match state
        .service_report_store
        .apply_report_change(&path.report_id, report.status, change)
        .await
    {
        Ok(Some(report)) => {
            record_confirmation();
            (
                StatusCode::OK,
                Json(ApiResponse::success(report_to_dto(report))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 用户取消
pub async fn cancel_report(
    State(state): State<AppState>,
    Path(path): Path<ReportPath>,
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
    let report = match state
        .service_report_store
        .find_owned_report(&path.report_id, &user.user_id)
        .await
    {
        Ok(Some(report)) => report,
        Ok(None) => return not_found_error(),
        Err(err) => return storage_error(err),
    };
    let cancelled = match SERVICE_REPORT.user_cancel(report.status) {
        Ok(status) => status,
        Err(err) => {
            record_transition_rejected();
            return lifecycle_error(err);
        }
    };
    let change = ReportStatusChange {
        cancel_reason: req
            .cancel_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string),
        ..ReportStatusChange::to(cancelled)
    };
    match state
        .service_report_store
        .apply_report_change(&path.report_id, report.status, change)
        .await
    {
        Ok(Some(report)) => {
            record_cancellation();
            (
                StatusCode::OK,
                Json(ApiResponse::success(report_to_dto(report))),
            )
                .into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 按服务聚合的报修统计
///
/// 钻取层级从细到粗取第一个命中（mahalla > district > region），
/// 渲染为对应层级的单字段谓词。
pub async fn service_stats(
    State(state): State<AppState>,
    Query(query): Query<ServiceStatsQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    let drill_down = if let Some(id) = &query.neighborhood_id {
        Some((RegionLevel::Neighborhood, id.clone()))
    } else if let Some(id) = &query.district_id {
        Some((RegionLevel::District, id.clone()))
    } else {
        query
            .region_id
            .as_ref()
            .map(|id| (RegionLevel::Region, id.clone()))
    };
    if let Err(response) =
        require_region_access(&user, drill_down.as_ref().map(|(_, id)| id.as_str()))
    {
        return response;
    }
    let allowed = match require_module(&user, Module::Services, RequiredAccess::Read) {
        Ok(allowed) => allowed,
        Err(response) => return response,
    };
    let scope = match drill_down {
        Some((level, id)) => RegionScope::AtLevel(level, id),
        None => scope_filter(&user.to_principal(), None),
    };

    let counts = match state
        .service_report_store
        .count_reports_by_service(&scope, &allowed, query.service_id.as_deref())
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };

    let mut stats = Vec::new();
    for (service_id, rows) in group_by_service(counts) {
        // 目录里已不存在的服务不出现在统计中
        let item = match state
            .catalog_store
            .find_item(CatalogKind::Service, &service_id)
            .await
        {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(err) => return storage_error(err),
        };
        stats.push(build_stat(&service_id, &item.name, &item.icon, &rows));
    }
    stats.sort_by(|a, b| a.service_name.cmp(&b.service_name));
    (StatusCode::OK, Json(ApiResponse::success(stats))).into_response()
}

fn group_by_service(
    counts: Vec<ServiceStatusCount>,
) -> BTreeMap<String, Vec<ServiceStatusCount>> {
    let mut grouped: BTreeMap<String, Vec<ServiceStatusCount>> = BTreeMap::new();
    for row in counts {
        grouped.entry(row.service_id.clone()).or_default().push(row);
    }
    grouped
}

fn build_stat(
    service_id: &str,
    name: &str,
    icon: &str,
    rows: &[ServiceStatusCount],
) -> ServiceStatDto {
    let count_of = |status: ServiceReportStatus| {
        rows.iter()
            .filter(|row| row.status == status)
            .map(|row| row.count)
            .sum::<u64>()
    };
    let unavailable = count_of(ServiceReportStatus::Unavailable);
    let in_progress = count_of(ServiceReportStatus::InProgress);
    let pending_confirmation = count_of(ServiceReportStatus::PendingConfirmation);
    let confirmed = count_of(ServiceReportStatus::Confirmed);
    let rejected = count_of(ServiceReportStatus::Rejected);
    let total = rows.iter().map(|row| row.count).sum::<u64>();
    let problem_count = unavailable + in_progress + pending_confirmation;
    let percent = |part: u64| {
        if total == 0 {
            0
        } else {
            ((part as f64 / total as f64) * 100.0).round() as u64
        }
    };
    ServiceStatDto {
        service_id: service_id.to_string(),
        service_name: name.to_string(),
        service_icon: icon.to_string(),
        total,
        unavailable,
        in_progress,
        pending_confirmation,
        confirmed,
        rejected,
        problem_count,
        problem_percent: percent(problem_count),
        available_percent: percent(confirmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};

    async fn submit(state: &AppState) -> String {
        let response = create_report(
            State(state.clone()),
            login_headers("user-1"),
            Json(api_contract::CreateServiceReportRequest {
                service_id: "svc-water".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let listed = state
            .service_report_store
            .list_owned_reports("user-1")
            .await
            .expect("list");
        listed[0].report_id.clone()
    }

    fn status_body(status: &str) -> api_contract::UpdateReportStatusRequest {
        api_contract::UpdateReportStatusRequest {
            status: status.to_string(),
            rejection_reason: None,
            admin_note: None,
        }
    }

    #[tokio::test]
    async fn direct_confirm_is_invalid() {
        let state = test_state().await;
        let report_id = submit(&state).await;
        // confirmed 只能经用户确认子迁移产生。
        let response = update_report_status(
            State(state),
            Path(ReportPath { report_id }),
            login_headers("admin-1"),
            Json(status_body("confirmed")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn confirmation_path_reaches_confirmed() {
        let state = test_state().await;
        let report_id = submit(&state).await;

        let response = update_report_status(
            State(state.clone()),
            Path(ReportPath {
                report_id: report_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("pending_confirmation")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = confirm_report(
            State(state.clone()),
            Path(ReportPath {
                report_id: report_id.clone(),
            }),
            login_headers("user-1"),
            Json(api_contract::ConfirmTicketRequest { confirmed: true }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let report = state
            .service_report_store
            .find_report(&report_id)
            .await
            .expect("find")
            .expect("report");
        assert_eq!(report.status, ServiceReportStatus::Confirmed);
        assert_eq!(report.confirmed_by_user, Some(true));
        assert_eq!(report.resolved_by_admin.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn declined_confirmation_returns_to_unavailable() {
        let state = test_state().await;
        let report_id = submit(&state).await;
        update_report_status(
            State(state.clone()),
            Path(ReportPath {
                report_id: report_id.clone(),
            }),
            login_headers("admin-1"),
            Json(status_body("pending_confirmation")),
        )
        .await;

        let response = confirm_report(
            State(state.clone()),
            Path(ReportPath {
                report_id: report_id.clone(),
            }),
            login_headers("user-1"),
            Json(api_contract::ConfirmTicketRequest { confirmed: false }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let report = state
            .service_report_store
            .find_report(&report_id)
            .await
            .expect("find")
            .expect("report");
        assert_eq!(report.status, ServiceReportStatus::Unavailable);
    }
}
