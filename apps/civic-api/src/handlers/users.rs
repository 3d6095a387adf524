//! 用户自助 handlers
//!
//! - GET /users/me - 个人资料
//! - PUT /users/me - 更新姓名
//! - PUT /users/region - 设置住址快照
//!
//! 住址设置时，未选中的 mahalla/街道若带自定义名称，则就地创建
//! 对应的区域节点并挂到上一级之下。

use crate::AppState;
use crate::middleware::require_principal;
use crate::utils::response::{bad_request_error, not_found_error, storage_error, user_to_dto};
use crate::utils::normalize_required;
use api_contract::{ApiResponse, SetAddressRequest, UpdateProfileRequest};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use civic_storage::{ProfileUpdate, RegionRecord};
use domain::{Address, RegionLevel};
use uuid::Uuid;

/// 个人资料
pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response()
}

/// 更新姓名
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    let update = ProfileUpdate {
        first_name: req.first_name,
        last_name: req.last_name,
    };
    match state.user_store.update_profile(&user.user_id, update).await {
        Ok(Some(user)) => {
            (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

/// 设置住址快照
pub async fn set_region(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SetAddressRequest>,
) -> Response {
    let user = match require_principal(&state, &headers).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    let region = match normalize_required(req.region, "region") {
        Ok(value) => value,
        Err(response) => return response,
    };
    let district = match normalize_required(req.district, "district") {
        Ok(value) => value,
        Err(response) => return response,
    };

    let mut address = Address {
        region: Some(region),
        district: Some(district.clone()),
        neighborhood: req.neighborhood,
        street: req.street,
        neighborhood_custom: req.neighborhood_custom.unwrap_or_default(),
        street_custom: req.street_custom.unwrap_or_default(),
        house_number: req.house_number.unwrap_or_default(),
        apartment: req.apartment.unwrap_or_default(),
    };

    // 自定义 mahalla：创建新节点挂到所选 district 之下
    if address.neighborhood.is_none() && !address.neighborhood_custom.trim().is_empty() {
        let record = RegionRecord {
            region_id: Uuid::new_v4().to_string(),
            name: address.neighborhood_custom.trim().to_string(),
            level: RegionLevel::Neighborhood,
            parent: Some(district.clone()),
            is_active: true,
        };
        match state.region_store.create_region(record).await {
            Ok(created) => {
                address.neighborhood = Some(created.region_id);
                address.neighborhood_custom = String::new();
            }
            Err(err) => return storage_error(err),
        }
    }

    // 自定义街道：仅在已有 mahalla 节点时创建
    if address.street.is_none() && !address.street_custom.trim().is_empty() {
        if let Some(neighborhood) = address.neighborhood.clone() {
            let record = RegionRecord {
                region_id: Uuid::new_v4().to_string(),
                name: address.street_custom.trim().to_string(),
                level: RegionLevel::Street,
                parent: Some(neighborhood),
                is_active: true,
            };
            match state.region_store.create_region(record).await {
                Ok(created) => {
                    address.street = Some(created.region_id);
                    address.street_custom = String::new();
                }
                Err(err) => return storage_error(err),
            }
        }
    }

    match state.user_store.set_address(&user.user_id, address).await {
        Ok(Some(user)) => {
            (StatusCode::OK, Json(ApiResponse::success(user_to_dto(user)))).into_response()
        }
        Ok(None) => not_found_error(),
        Err(err) => storage_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{login_headers, test_state};
    use civic_storage::{RegionStore, UserStore};

    #[tokio::test]
    async fn custom_neighborhood_creates_region_node() {
        let state = test_state().await;
        let headers = login_headers("user-1");
        let response = set_region(
            State(state.clone()),
            headers,
            Json(api_contract::SetAddressRequest {
                region: "r-1".to_string(),
                district: "d-1".to_string(),
                neighborhood: None,
                street: None,
                neighborhood_custom: Some("New Mahalla".to_string()),
                street_custom: None,
                house_number: None,
                apartment: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let user = state
            .user_store
            .find_by_id("user-1")
            .await
            .expect("find")
            .expect("user");
        let address = user.address.expect("address");
        let neighborhood = address.neighborhood.expect("neighborhood node");
        let node = state
            .region_store
            .find_region(&neighborhood)
            .await
            .expect("find")
            .expect("created node");
        assert_eq!(node.name, "New Mahalla");
        assert_eq!(node.parent.as_deref(), Some("d-1"));
    }
}
