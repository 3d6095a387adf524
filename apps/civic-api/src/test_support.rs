//! handler 测试装配：内存存储 + 预置账户与区域。

use crate::AppState;
use axum::http::{HeaderMap, HeaderValue, header};
use civic_auth::{AuthService, JwtManager};
use civic_storage::{
    InMemoryCatalogStore, InMemoryMskOrderStore, InMemoryRegionStore, InMemoryRequestStore,
    InMemoryServiceReportStore, InMemoryUserStore, RegionRecord, RegionStore, UserRecord,
    UserStore,
};
use domain::{Address, RegionLevel, RoleKind};
use std::sync::Arc;

pub const TEST_SECRET: &str = "secret";

fn user(user_id: &str, phone: &str, role: RoleKind, address: Option<Address>) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        phone: phone.to_string(),
        password_hash: String::new(),
        first_name: user_id.to_string(),
        last_name: String::new(),
        alias: String::new(),
        role,
        is_active: true,
        assigned_region: None,
        grants: None,
        address,
        created_at_ms: 0,
    }
}

fn node(id: &str, name: &str, level: RegionLevel, parent: Option<&str>) -> RegionRecord {
    RegionRecord {
        region_id: id.to_string(),
        name: name.to_string(),
        level,
        parent: parent.map(str::to_string),
        is_active: true,
    }
}

/// 市民种子账户的住址（r-1 / d-1）。
pub fn citizen_address() -> Address {
    Address {
        region: Some("r-1".to_string()),
        district: Some("d-1".to_string()),
        ..Address::default()
    }
}

/// 内存态 AppState：owner-1 / admin-1 / user-1 三个账户，
/// r-1（region）与 d-1（district）两个区域节点。
pub async fn test_state() -> AppState {
    let user_store = Arc::new(InMemoryUserStore::new());
    user_store
        .create_user(user("owner-1", "+100", RoleKind::Owner, None))
        .await
        .expect("seed owner");
    user_store
        .create_user(user("admin-1", "+101", RoleKind::Admin, None))
        .await
        .expect("seed admin");
    user_store
        .create_user(user("user-1", "+102", RoleKind::User, Some(citizen_address())))
        .await
        .expect("seed citizen");

    let region_store = Arc::new(InMemoryRegionStore::new());
    region_store
        .create_region(node("r-1", "Region One", RegionLevel::Region, None))
        .await
        .expect("seed region");
    region_store
        .create_region(node("d-1", "District One", RegionLevel::District, Some("r-1")))
        .await
        .expect("seed district");

    let jwt = JwtManager::new(TEST_SECRET.to_string(), 3600);
    let auth = Arc::new(AuthService::new(user_store.clone(), jwt));

    AppState {
        auth,
        user_store,
        region_store,
        catalog_store: Arc::new(InMemoryCatalogStore::new()),
        request_store: Arc::new(InMemoryRequestStore::new()),
        service_report_store: Arc::new(InMemoryServiceReportStore::new()),
        msk_order_store: Arc::new(InMemoryMskOrderStore::new()),
    }
}

/// 为指定用户签发 Bearer 头。
pub fn login_headers(user_id: &str) -> HeaderMap {
    let jwt = JwtManager::new(TEST_SECRET.to_string(), 3600);
    let issued = jwt.issue(user_id).expect("token");
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", issued.token)).expect("header"),
    );
    headers
}
