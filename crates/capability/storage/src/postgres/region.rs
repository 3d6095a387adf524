//! Postgres 区域树存储实现

use crate::error::StorageError;
use crate::models::{ParentFilter, RegionFilter, RegionRecord, RegionUpdate};
use crate::traits::RegionStore;
use domain::RegionLevel;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

const REGION_COLUMNS: &str = "region_id, name, level, parent_id, is_active";

pub struct PgRegionStore {
    pub pool: PgPool,
}

impl PgRegionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_region_row(row: &PgRow) -> Result<RegionRecord, StorageError> {
    let level_text: String = row.try_get("level")?;
    let level = RegionLevel::parse(&level_text)
        .ok_or_else(|| StorageError::new(format!("invalid region level: {level_text}")))?;
    Ok(RegionRecord {
        region_id: row.try_get("region_id")?,
        name: row.try_get("name")?,
        level,
        parent: row.try_get("parent_id")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait::async_trait]
impl RegionStore for PgRegionStore {
    /// 按层级/父节点列出区域（名称升序）
    async fn list_regions(&self, filter: RegionFilter) -> Result<Vec<RegionRecord>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("select {REGION_COLUMNS} from regions where 1=1"));
        if let Some(level) = filter.level {
            builder.push(" and level = ");
            builder.push_bind(level.as_str());
        }
        match &filter.parent {
            None => {}
            Some(ParentFilter::Root) => {
                builder.push(" and parent_id is null");
            }
            Some(ParentFilter::Node(parent_id)) => {
                builder.push(" and parent_id = ");
                builder.push_bind(parent_id.clone());
            }
        }
        builder.push(" order by name asc");
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(map_region_row).collect()
    }

    /// 查找指定区域
    async fn find_region(&self, region_id: &str) -> Result<Option<RegionRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {REGION_COLUMNS} from regions where region_id = $1"
        ))
        .bind(region_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_region_row).transpose()
    }

    /// 创建区域节点
    async fn create_region(&self, record: RegionRecord) -> Result<RegionRecord, StorageError> {
        sqlx::query(
            "insert into regions (region_id, name, level, parent_id, is_active) \
             values ($1, $2, $3, $4, $5)",
        )
        .bind(&record.region_id)
        .bind(&record.name)
        .bind(record.level.as_str())
        .bind(&record.parent)
        .bind(record.is_active)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    /// 同名同层级同父节点是否已存在
    async fn region_exists(
        &self,
        name: &str,
        level: RegionLevel,
        parent: Option<&str>,
    ) -> Result<bool, StorageError> {
        let exists: Option<i32> = sqlx::query_scalar(
            "select 1 from regions \
             where name = $1 and level = $2 and parent_id is not distinct from $3",
        )
        .bind(name)
        .bind(level.as_str())
        .bind(parent)
        .fetch_optional(&self.pool)
        .await?;
        Ok(exists.is_some())
    }

    /// 更新区域节点
    async fn update_region(
        &self,
        region_id: &str,
        update: RegionUpdate,
    ) -> Result<Option<RegionRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update regions set \
             name = coalesce($1, name), \
             is_active = coalesce($2, is_active) \
             where region_id = $3 \
             returning {REGION_COLUMNS}"
        ))
        .bind(update.name)
        .bind(update.is_active)
        .bind(region_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_region_row).transpose()
    }

    /// 删除区域节点
    async fn delete_region(&self, region_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from regions where region_id = $1")
            .bind(region_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 子节点数量
    async fn count_children(&self, region_id: &str) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("select count(*) from regions where parent_id = $1")
            .bind(region_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
