//! 用户内存存储实现
//!
//! 仅用于本地演示和测试。
//!
//! 功能：
//! - 可选内置 owner 账户（手机号：+000000000000，口令：owner123）
//! - 用户/管理员查询与更新，管理员方法只作用于 admin 角色记录

use crate::error::StorageError;
use crate::models::{AdminUpdate, ProfileUpdate, UserRecord};
use crate::traits::UserStore;
use domain::{Address, AdminGrants, AssignedRegion, RoleKind};
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// 内置 owner 账户
    ///
    /// 口令为明文种子，首次登录时升级为 argon2 哈希。
    pub fn with_default_owner() -> Self {
        let mut users = HashMap::new();
        users.insert(
            "owner-1".to_string(),
            UserRecord {
                user_id: "owner-1".to_string(),
                phone: "+000000000000".to_string(),
                password_hash: "owner123".to_string(),
                first_name: "Owner".to_string(),
                last_name: "".to_string(),
                alias: "".to_string(),
                role: RoleKind::Owner,
                is_active: true,
                assigned_region: None,
                grants: None,
                address: None,
                created_at_ms: 0,
            },
        );
        Self {
            users: RwLock::new(users),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .users
            .read()
            .ok()
            .and_then(|map| map.get(user_id).cloned()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self.users.read().ok().and_then(|map| {
            map.values().find(|user| user.phone == phone).cloned()
        }))
    }

    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.user_id) {
            return Err(StorageError::new("user exists"));
        }
        if map.values().any(|user| user.phone == record.phone) {
            return Err(StorageError::new("phone exists"));
        }
        map.insert(record.user_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get_mut(user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) => user,
            None => return Ok(None),
        };
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        Ok(Some(user.clone()))
    }

    async fn set_address(
        &self,
        user_id: &str,
        address: Address,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) => user,
            None => return Ok(None),
        };
        user.address = Some(address);
        Ok(Some(user.clone()))
    }

    async fn list_admins(&self) -> Result<Vec<UserRecord>, StorageError> {
        let mut admins: Vec<UserRecord> = self
            .users
            .read()
            .map(|map| {
                map.values()
                    .filter(|user| user.role == RoleKind::Admin)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        admins.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(admins)
    }

    async fn find_admin(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self.users.read().ok().and_then(|map| {
            map.get(user_id)
                .filter(|user| user.role == RoleKind::Admin)
                .cloned()
        }))
    }

    async fn update_admin(
        &self,
        user_id: &str,
        update: AdminUpdate,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) if user.role == RoleKind::Admin => user,
            _ => return Ok(None),
        };
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(alias) = update.alias {
            user.alias = alias;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_admin(&self, user_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get(user_id) {
            Some(user) if user.role == RoleKind::Admin => {
                map.remove(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_assigned_region(
        &self,
        user_id: &str,
        assigned_region: Option<AssignedRegion>,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) if user.role == RoleKind::Admin => user,
            _ => return Ok(None),
        };
        user.assigned_region = assigned_region;
        Ok(Some(user.clone()))
    }

    async fn set_grants(
        &self,
        user_id: &str,
        grants: AdminGrants,
    ) -> Result<Option<UserRecord>, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let user = match map.get_mut(user_id) {
            Some(user) if user.role == RoleKind::Admin => user,
            _ => return Ok(None),
        };
        user.grants = Some(grants);
        Ok(Some(user.clone()))
    }

    async fn count_citizens(&self) -> Result<u64, StorageError> {
        Ok(self
            .users
            .read()
            .map(|map| {
                map.values()
                    .filter(|user| user.role == RoleKind::User)
                    .count() as u64
            })
            .unwrap_or_default())
    }
}
