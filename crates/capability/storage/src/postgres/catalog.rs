//! Postgres 子类型目录存储实现
//!
//! 三类目录条目（诉求类型 / 服务 / 社区服务类目）共用一张表，
//! kind 列区分。

use crate::error::StorageError;
use crate::models::{CatalogKind, CatalogRecord, CatalogUpdate};
use crate::traits::CatalogStore;
use sqlx::{PgPool, Row, postgres::PgRow};

const CATALOG_COLUMNS: &str = "item_id, kind, name, icon, is_active";

pub struct PgCatalogStore {
    pub pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_kind(value: &str) -> Result<CatalogKind, StorageError> {
    match value {
        "request_type" => Ok(CatalogKind::RequestType),
        "service" => Ok(CatalogKind::Service),
        "msk_category" => Ok(CatalogKind::MskCategory),
        other => Err(StorageError::new(format!("invalid catalog kind: {other}"))),
    }
}

fn map_catalog_row(row: &PgRow) -> Result<CatalogRecord, StorageError> {
    let kind_text: String = row.try_get("kind")?;
    Ok(CatalogRecord {
        item_id: row.try_get("item_id")?,
        kind: parse_kind(&kind_text)?,
        name: row.try_get("name")?,
        icon: row.try_get("icon")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    /// 列出启用的条目（名称升序）
    async fn list_active(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {CATALOG_COLUMNS} from catalog_items \
             where kind = $1 and is_active = true order by name asc"
        ))
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_catalog_row).collect()
    }

    /// 查找指定条目
    async fn find_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {CATALOG_COLUMNS} from catalog_items where kind = $1 and item_id = $2"
        ))
        .bind(kind.as_str())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_catalog_row).transpose()
    }

    /// 按名称查重
    async fn find_by_name(
        &self,
        kind: CatalogKind,
        name: &str,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {CATALOG_COLUMNS} from catalog_items where kind = $1 and name = $2"
        ))
        .bind(kind.as_str())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_catalog_row).transpose()
    }

    /// 创建条目
    async fn create_item(&self, record: CatalogRecord) -> Result<CatalogRecord, StorageError> {
        sqlx::query(
            "insert into catalog_items (item_id, kind, name, icon, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.item_id)
        .bind(record.kind.as_str())
        .bind(&record.name)
        .bind(&record.icon)
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    /// 更新条目
    async fn update_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
        update: CatalogUpdate,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update catalog_items set \
             name = coalesce($1, name), \
             icon = coalesce($2, icon), \
             is_active = coalesce($3, is_active) \
             where kind = $4 and item_id = $5 \
             returning {CATALOG_COLUMNS}"
        ))
        .bind(update.name)
        .bind(update.icon)
        .bind(update.is_active)
        .bind(kind.as_str())
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_catalog_row).transpose()
    }

    /// 删除条目
    async fn delete_item(&self, kind: CatalogKind, item_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from catalog_items where kind = $1 and item_id = $2")
            .bind(kind.as_str())
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
