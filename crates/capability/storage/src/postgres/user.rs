//! Postgres 用户存储实现
//!
//! 授权配置（grants）与住址快照（address）存为 JSONB；指派区域拆成
//! id + 层级两列，便于按列校验。

use crate::error::StorageError;
use crate::models::{AdminUpdate, ProfileUpdate, UserRecord};
use crate::traits::UserStore;
use domain::{Address, AdminGrants, AssignedRegion, RegionLevel, RoleKind};
use sqlx::{PgPool, Row, postgres::PgRow};

const USER_COLUMNS: &str = "user_id, phone, password_hash, first_name, last_name, alias, role, \
     is_active, assigned_region_id, assigned_region_level, grants, address, created_at_ms";

pub struct PgUserStore {
    pub pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn map_user_row(row: &PgRow) -> Result<UserRecord, StorageError> {
    let role_text: String = row.try_get("role")?;
    let role = RoleKind::parse(&role_text)
        .ok_or_else(|| StorageError::new(format!("invalid role: {role_text}")))?;

    let assigned_region_id: Option<String> = row.try_get("assigned_region_id")?;
    let assigned_region_level: Option<String> = row.try_get("assigned_region_level")?;
    let assigned_region = match (assigned_region_id, assigned_region_level) {
        (Some(region), Some(level_text)) => {
            let level = RegionLevel::parse(&level_text)
                .ok_or_else(|| StorageError::new(format!("invalid region level: {level_text}")))?;
            Some(AssignedRegion { region, level })
        }
        _ => None,
    };

    let grants: Option<serde_json::Value> = row.try_get("grants")?;
    let grants = grants
        .map(serde_json::from_value::<AdminGrants>)
        .transpose()
        .map_err(|err| StorageError::new(format!("invalid grants payload: {err}")))?;

    let address: Option<serde_json::Value> = row.try_get("address")?;
    let address = address
        .map(serde_json::from_value::<Address>)
        .transpose()
        .map_err(|err| StorageError::new(format!("invalid address payload: {err}")))?;

    Ok(UserRecord {
        user_id: row.try_get("user_id")?,
        phone: row.try_get("phone")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        alias: row.try_get("alias")?,
        role,
        is_active: row.try_get("is_active")?,
        assigned_region,
        grants,
        address,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    /// 根据 id 查找用户
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {USER_COLUMNS} from users where user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 根据手机号查找用户
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!("select {USER_COLUMNS} from users where phone = $1"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 创建用户
    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError> {
        let grants = record
            .grants
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| StorageError::new(err.to_string()))?;
        let address = record
            .address
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| StorageError::new(err.to_string()))?;
        sqlx::query(
            "insert into users (user_id, phone, password_hash, first_name, last_name, alias, \
             role, is_active, assigned_region_id, assigned_region_level, grants, address, \
             created_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&record.user_id)
        .bind(&record.phone)
        .bind(&record.password_hash)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.alias)
        .bind(record.role.as_str())
        .bind(record.is_active)
        .bind(record.assigned_region.as_ref().map(|ar| ar.region.clone()))
        .bind(record.assigned_region.as_ref().map(|ar| ar.level.as_str()))
        .bind(grants)
        .bind(address)
        .bind(record.created_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    /// 更新口令哈希
    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("update users set password_hash = $1 where user_id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 更新个人资料
    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update users set \
             first_name = coalesce($1, first_name), \
             last_name = coalesce($2, last_name) \
             where user_id = $3 \
             returning {USER_COLUMNS}"
        ))
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 覆盖住址快照
    async fn set_address(
        &self,
        user_id: &str,
        address: Address,
    ) -> Result<Option<UserRecord>, StorageError> {
        let address =
            serde_json::to_value(&address).map_err(|err| StorageError::new(err.to_string()))?;
        let row = sqlx::query(&format!(
            "update users set address = $1 where user_id = $2 returning {USER_COLUMNS}"
        ))
        .bind(address)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 列出全部管理员
    async fn list_admins(&self) -> Result<Vec<UserRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {USER_COLUMNS} from users where role = 'admin' order by created_at_ms desc"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_user_row).collect()
    }

    /// 查找指定管理员
    async fn find_admin(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {USER_COLUMNS} from users where user_id = $1 and role = 'admin'"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 更新管理员资料
    async fn update_admin(
        &self,
        user_id: &str,
        update: AdminUpdate,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update users set \
             first_name = coalesce($1, first_name), \
             last_name = coalesce($2, last_name), \
             alias = coalesce($3, alias), \
             is_active = coalesce($4, is_active), \
             password_hash = coalesce($5, password_hash) \
             where user_id = $6 and role = 'admin' \
             returning {USER_COLUMNS}"
        ))
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.alias)
        .bind(update.is_active)
        .bind(update.password_hash)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 删除管理员
    async fn delete_admin(&self, user_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from users where user_id = $1 and role = 'admin'")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 指派/清除管理员负责区域
    async fn set_assigned_region(
        &self,
        user_id: &str,
        assigned_region: Option<AssignedRegion>,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update users set assigned_region_id = $1, assigned_region_level = $2 \
             where user_id = $3 and role = 'admin' \
             returning {USER_COLUMNS}"
        ))
        .bind(assigned_region.as_ref().map(|ar| ar.region.clone()))
        .bind(assigned_region.as_ref().map(|ar| ar.level.as_str()))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 覆盖管理员模块授权
    async fn set_grants(
        &self,
        user_id: &str,
        grants: AdminGrants,
    ) -> Result<Option<UserRecord>, StorageError> {
        let grants =
            serde_json::to_value(&grants).map_err(|err| StorageError::new(err.to_string()))?;
        let row = sqlx::query(&format!(
            "update users set grants = $1 where user_id = $2 and role = 'admin' \
             returning {USER_COLUMNS}"
        ))
        .bind(grants)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_user_row).transpose()
    }

    /// 市民账户总数
    async fn count_citizens(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("select count(*) from users where role = 'user'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
