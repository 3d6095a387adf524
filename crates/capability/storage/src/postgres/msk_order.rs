//! Postgres 社区服务订单存储实现

use crate::error::StorageError;
use crate::filter::{push_allow_list, push_pagination, push_region_scope};
use crate::models::{MskOrderRecord, OrderContentUpdate, OrderQuery, OrderStatusChange};
use crate::postgres::{ADDRESS_COLUMNS, address_from_row};
use crate::traits::MskOrderStore;
use domain::{AllowList, MskOrderStatus, RegionScope};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

fn order_columns() -> String {
    format!(
        "order_id, category_id, user_id, description, contact_first_name, contact_last_name, \
         contact_phone, status, rejection_reason, cancel_reason, assigned_admin, \
         confirmed_by_user, {ADDRESS_COLUMNS}, created_at_ms"
    )
}

pub struct PgMskOrderStore {
    pub pool: PgPool,
}

impl PgMskOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_order_row(row: &PgRow) -> Result<MskOrderRecord, StorageError> {
    let status_text: String = row.try_get("status")?;
    let status = MskOrderStatus::parse(&status_text)
        .ok_or_else(|| StorageError::new(format!("invalid order status: {status_text}")))?;
    Ok(MskOrderRecord {
        order_id: row.try_get("order_id")?,
        category_id: row.try_get("category_id")?,
        user_id: row.try_get("user_id")?,
        description: row.try_get("description")?,
        contact_first_name: row.try_get("contact_first_name")?,
        contact_last_name: row.try_get("contact_last_name")?,
        contact_phone: row.try_get("contact_phone")?,
        status,
        rejection_reason: row.try_get("rejection_reason")?,
        cancel_reason: row.try_get("cancel_reason")?,
        assigned_admin: row.try_get("assigned_admin")?,
        confirmed_by_user: row.try_get("confirmed_by_user")?,
        address: address_from_row(row)?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

fn push_filters<'q>(builder: &mut QueryBuilder<'q, Postgres>, query: &'q OrderQuery) {
    if let Some(status) = query.status {
        builder.push(" and status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(category_id) = &query.category_id {
        builder.push(" and category_id = ");
        builder.push_bind(category_id);
    }
    push_region_scope(builder, &query.scope);
    push_allow_list(builder, "category_id", &query.allowed);
}

#[async_trait::async_trait]
impl MskOrderStore for PgMskOrderStore {
    /// 创建订单
    async fn create_order(&self, record: MskOrderRecord) -> Result<MskOrderRecord, StorageError> {
        sqlx::query(
            "insert into msk_orders (order_id, category_id, user_id, description, \
             contact_first_name, contact_last_name, contact_phone, status, rejection_reason, \
             cancel_reason, assigned_admin, confirmed_by_user, address_region, address_district, \
             address_neighborhood, address_street, address_neighborhood_custom, \
             address_street_custom, address_house_number, address_apartment, created_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21)",
        )
        .bind(&record.order_id)
        .bind(&record.category_id)
        .bind(&record.user_id)
        .bind(&record.description)
        .bind(&record.contact_first_name)
        .bind(&record.contact_last_name)
        .bind(&record.contact_phone)
        .bind(record.status.as_str())
        .bind(&record.rejection_reason)
        .bind(&record.cancel_reason)
        .bind(&record.assigned_admin)
        .bind(record.confirmed_by_user)
        .bind(&record.address.region)
        .bind(&record.address.district)
        .bind(&record.address.neighborhood)
        .bind(&record.address.street)
        .bind(&record.address.neighborhood_custom)
        .bind(&record.address.street_custom)
        .bind(&record.address.house_number)
        .bind(&record.address.apartment)
        .bind(record.created_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    /// 查找订单（管理侧）
    async fn find_order(&self, order_id: &str) -> Result<Option<MskOrderRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from msk_orders where order_id = $1",
            order_columns()
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_order_row).transpose()
    }

    /// 查找归属指定用户的订单
    async fn find_owned_order(
        &self,
        order_id: &str,
        user_id: &str,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from msk_orders where order_id = $1 and user_id = $2",
            order_columns()
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_order_row).transpose()
    }

    /// 用户自己的订单列表（创建时间倒序）
    async fn list_owned_orders(
        &self,
        user_id: &str,
    ) -> Result<Vec<MskOrderRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {} from msk_orders where user_id = $1 order by created_at_ms desc",
            order_columns()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_order_row).collect()
    }

    /// 管理侧分页列表
    async fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<(Vec<MskOrderRecord>, u64), StorageError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "select {} from msk_orders where 1=1",
            order_columns()
        ));
        push_filters(&mut builder, query);
        push_pagination(&mut builder, query.page, query.limit);
        let rows = builder.build().fetch_all(&self.pool).await?;
        let orders = rows
            .iter()
            .map(map_order_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select count(*) from msk_orders where 1=1");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok((orders, total as u64))
    }

    /// 内容编辑
    async fn update_order_content(
        &self,
        order_id: &str,
        user_id: &str,
        update: OrderContentUpdate,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update msk_orders set \
             description = coalesce($1, description), \
             contact_first_name = coalesce($2, contact_first_name), \
             contact_last_name = coalesce($3, contact_last_name), \
             contact_phone = coalesce($4, contact_phone) \
             where order_id = $5 and user_id = $6 \
             returning {}",
            order_columns()
        ))
        .bind(update.description)
        .bind(update.contact_first_name)
        .bind(update.contact_last_name)
        .bind(update.contact_phone)
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_order_row).transpose()
    }

    /// 条件状态写入
    async fn apply_order_change(
        &self,
        order_id: &str,
        expected: MskOrderStatus,
        change: OrderStatusChange,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("update msk_orders set status = ");
        builder.push_bind(change.status.as_str());
        if let Some(admin) = change.assigned_admin {
            builder.push(", assigned_admin = ");
            builder.push_bind(admin);
        }
        if let Some(confirmed) = change.confirmed_by_user {
            builder.push(", confirmed_by_user = ");
            builder.push_bind(confirmed);
        }
        if let Some(reason) = change.rejection_reason {
            builder.push(", rejection_reason = ");
            builder.push_bind(reason);
        }
        if let Some(reason) = change.cancel_reason {
            builder.push(", cancel_reason = ");
            builder.push_bind(reason);
        }
        builder.push(" where order_id = ");
        builder.push_bind(order_id);
        builder.push(" and status = ");
        builder.push_bind(expected.as_str());
        builder.push(format!(" returning {}", order_columns()));

        let row = builder.build().fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(map_order_row(&row)?)),
            None => {
                // 区分"不存在"与"状态已被并发修改"
                let exists: Option<i32> =
                    sqlx::query_scalar("select 1 from msk_orders where order_id = $1")
                        .bind(order_id)
                        .fetch_optional(&self.pool)
                        .await?;
                if exists.is_some() {
                    Err(StorageError::Conflict)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// 可见范围内按状态分组计数
    async fn count_orders_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select status, count(*) as count from msk_orders where 1=1");
        push_region_scope(&mut builder, scope);
        push_allow_list(&mut builder, "category_id", allowed);
        builder.push(" group by status");
        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            counts.push((status, count as u64));
        }
        Ok(counts)
    }
}
