//! 总览与区域钻取统计 handlers
//!
//! - GET /stats/dashboard - 三种工单的状态分布 + 市民总数
//! - GET /stats/by-region - 指定区域 + 层级的状态分布
//!
//! 两者只做区域范围限制（管理员看自己负责的区域，owner 看全量）；
//! 模块白名单过滤属于各模块自己的 stats 接口。

use crate::AppState;
use crate::middleware::{require_principal, require_region_access, require_role};
use crate::utils::response::{bad_request_error, storage_error};
use api_contract::{ApiResponse, DashboardDto, RegionStatsDto, RegionStatsQuery, StatusCounts};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::{AllowList, RegionLevel, RegionScope, RoleKind, scope_filter};

/// 总览面板
pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    let scope = scope_filter(&user.to_principal(), None);

    let requests = match state
        .request_store
        .count_requests_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };
    let reports = match state
        .service_report_store
        .count_reports_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };
    let orders = match state
        .msk_order_store
        .count_orders_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };
    let total_users = match state.user_store.count_citizens().await {
        Ok(count) => count,
        Err(err) => return storage_error(err),
    };

    let dto = DashboardDto {
        requests: StatusCounts::from_counts(requests),
        service_reports: StatusCounts::from_counts(reports),
        msk_orders: StatusCounts::from_counts(orders),
        total_users,
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

/// 区域钻取统计
pub async fn stats_by_region(
    State(state): State<AppState>,
    Query(query): Query<RegionStatsQuery>,
    headers: HeaderMap,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner, RoleKind::Admin]) {
        return response;
    }
    let Some(region_id) = query.region_id else {
        return bad_request_error("regionId required");
    };
    if let Err(response) = require_region_access(&user, Some(&region_id)) {
        return response;
    }
    let level = match query.region_type.as_deref() {
        Some(value) => match RegionLevel::parse(value) {
            Some(level) => level,
            None => return bad_request_error(format!("invalid region level: {value}")),
        },
        None => RegionLevel::Region,
    };
    let scope = RegionScope::AtLevel(level, region_id);

    let requests = match state
        .request_store
        .count_requests_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };
    let reports = match state
        .service_report_store
        .count_reports_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };
    let orders = match state
        .msk_order_store
        .count_orders_by_status(&scope, &AllowList::Unrestricted)
        .await
    {
        Ok(counts) => counts,
        Err(err) => return storage_error(err),
    };

    let dto = RegionStatsDto {
        requests: StatusCounts::from_counts(requests),
        service_reports: StatusCounts::from_counts(reports),
        msk_orders: StatusCounts::from_counts(orders),
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};

    #[tokio::test]
    async fn by_region_requires_region_id() {
        let state = test_state().await;
        let response = stats_by_region(
            State(state),
            Query(api_contract::RegionStatsQuery {
                region_id: None,
                region_type: None,
            }),
            login_headers("owner-1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_limited_to_assigned_region() {
        let state = test_state().await;
        // admin-1 未被指派区域：任何钻取都是 403。
        let response = stats_by_region(
            State(state),
            Query(api_contract::RegionStatsQuery {
                region_id: Some("r-1".to_string()),
                region_type: Some("region".to_string()),
            }),
            login_headers("admin-1"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
