//! 流量计数 handlers
//!
//! - GET /metrics - 工单流量计数快照（owner 专用）

use crate::AppState;
use crate::middleware::{require_principal, require_role};
use api_contract::{ApiResponse, MetricsDto};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::RoleKind;

/// 工单流量计数快照
pub async fn get_metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Err(response) = require_role(&user, &[RoleKind::Owner]) {
        return response;
    }
    let snapshot = civic_telemetry::metrics().snapshot();
    let dto = MetricsDto {
        tickets_created: snapshot.tickets_created,
        transitions_applied: snapshot.transitions_applied,
        transitions_rejected: snapshot.transitions_rejected,
        confirmations: snapshot.confirmations,
        cancellations: snapshot.cancellations,
    };
    (StatusCode::OK, Json(ApiResponse::success(dto))).into_response()
}
