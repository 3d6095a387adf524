//! 认证能力：注册、登录、JWT 签发与校验。
//!
//! token 只携带用户 id；每个请求由中间件从 UserStore 重新加载用户，
//! 保证权限与区域指派的修改即时生效。

mod jwt;
mod password;

use civic_storage::{UserRecord, UserStore};
use domain::RoleKind;
use std::sync::Arc;

pub use jwt::JwtManager;
pub use password::{PasswordVerdict, hash_password, verify_password};

/// 认证相关错误。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("phone already registered")]
    PhoneTaken,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("internal error: {0}")]
    Internal(String),
}

/// 登录/注册返回的 token 结构。
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

/// 认证服务实现（基于 UserStore + JWT）。
pub struct AuthService {
    user_store: Arc<dyn UserStore>,
    jwt: JwtManager,
}

impl AuthService {
    /// 创建认证服务实例。
    pub fn new(user_store: Arc<dyn UserStore>, jwt: JwtManager) -> Self {
        Self { user_store, jwt }
    }

    /// 注册普通市民账户并签发 token。
    pub async fn register(
        &self,
        record: UserRecord,
        password: &str,
    ) -> Result<(UserRecord, IssuedToken), AuthError> {
        let existing = self
            .user_store
            .find_by_phone(&record.phone)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        if existing.is_some() {
            return Err(AuthError::PhoneTaken);
        }

        let mut record = record;
        record.password_hash = hash_password(password)?;
        let created = self
            .user_store
            .create_user(record)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        let token = self.jwt.issue(&created.user_id)?;
        Ok((created, token))
    }

    /// 市民登录。
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<(UserRecord, IssuedToken), AuthError> {
        self.login_with_roles(phone, password, &[RoleKind::Owner, RoleKind::Admin, RoleKind::User])
            .await
    }

    /// 管理端登录：仅 owner 与 admin 角色可通过。
    pub async fn admin_login(
        &self,
        phone: &str,
        password: &str,
    ) -> Result<(UserRecord, IssuedToken), AuthError> {
        self.login_with_roles(phone, password, &[RoleKind::Owner, RoleKind::Admin])
            .await
    }

    /// 校验 access token 并提取用户 id。
    pub fn verify_token(&self, token: &str) -> Result<String, AuthError> {
        self.jwt.verify(token)
    }

    async fn login_with_roles(
        &self,
        phone: &str,
        password: &str,
        roles: &[RoleKind],
    ) -> Result<(UserRecord, IssuedToken), AuthError> {
        let user = self
            .user_store
            .find_by_phone(phone)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.is_active || !roles.contains(&user.role) {
            return Err(AuthError::InvalidCredentials);
        }

        match verify_password(&user.password_hash, password)? {
            PasswordVerdict::Mismatch => return Err(AuthError::InvalidCredentials),
            PasswordVerdict::Match => {}
            PasswordVerdict::MatchNeedsRehash(new_hash) => {
                // 旧格式口令：登录成功后就地升级为 argon2 哈希。
                let updated = self
                    .user_store
                    .update_password_hash(&user.user_id, &new_hash)
                    .await
                    .map_err(|err| AuthError::Internal(err.to_string()))?;
                if !updated {
                    return Err(AuthError::Internal(
                        "password migration update failed".to_string(),
                    ));
                }
            }
        }

        let token = self.jwt.issue(&user.user_id)?;
        Ok((user, token))
    }
}
