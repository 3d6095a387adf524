use civic_auth::{AuthError, AuthService, JwtManager};
use civic_storage::{InMemoryUserStore, UserRecord, UserStore};
use domain::RoleKind;
use std::sync::Arc;

fn citizen(user_id: &str, phone: &str) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        phone: phone.to_string(),
        password_hash: String::new(),
        first_name: "Test".to_string(),
        last_name: "".to_string(),
        alias: "".to_string(),
        role: RoleKind::User,
        is_active: true,
        assigned_region: None,
        grants: None,
        address: None,
        created_at_ms: 0,
    }
}

fn service(store: Arc<InMemoryUserStore>) -> AuthService {
    AuthService::new(store, JwtManager::new("secret".to_string(), 3600))
}

#[tokio::test]
async fn register_then_login() {
    let store = Arc::new(InMemoryUserStore::new());
    let auth = service(store.clone());

    let (user, issued) = auth
        .register(citizen("user-1", "+100"), "pass123")
        .await
        .expect("register");
    assert!(user.password_hash.starts_with("$argon2"));
    assert_eq!(auth.verify_token(&issued.token).expect("verify"), "user-1");

    let (_, issued) = auth.login("+100", "pass123").await.expect("login");
    assert_eq!(auth.verify_token(&issued.token).expect("verify"), "user-1");
}

#[tokio::test]
async fn duplicate_phone_rejected() {
    let store = Arc::new(InMemoryUserStore::new());
    let auth = service(store.clone());
    auth.register(citizen("user-1", "+100"), "pass123")
        .await
        .expect("register");
    let err = auth
        .register(citizen("user-2", "+100"), "pass456")
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AuthError::PhoneTaken));
}

#[tokio::test]
async fn seeded_plaintext_upgrades_on_login() {
    let store = Arc::new(InMemoryUserStore::with_default_owner());
    let auth = service(store.clone());

    auth.login("+000000000000", "owner123").await.expect("login");
    let owner = store
        .find_by_phone("+000000000000")
        .await
        .expect("find")
        .expect("owner");
    assert!(owner.password_hash.starts_with("$argon2"));

    // 升级后的哈希仍可登录。
    auth.login("+000000000000", "owner123").await.expect("relogin");
}

#[tokio::test]
async fn admin_login_rejects_citizen_role() {
    let store = Arc::new(InMemoryUserStore::new());
    let auth = service(store.clone());
    auth.register(citizen("user-1", "+100"), "pass123")
        .await
        .expect("register");

    let err = auth.admin_login("+100", "pass123").await.expect_err("role gate");
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn inactive_account_cannot_login() {
    let store = Arc::new(InMemoryUserStore::new());
    let auth = service(store.clone());
    let mut record = citizen("user-1", "+100");
    record.is_active = false;
    let err = auth.register(record, "pass123").await;
    // 注册本身不拦截；登录时拦截。
    assert!(err.is_ok());
    let err = auth.login("+100", "pass123").await.expect_err("inactive");
    assert!(matches!(err, AuthError::InvalidCredentials));
}
