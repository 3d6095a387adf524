//! Postgres 诉求工单存储实现
//!
//! 列表与分组计数共用同一套过滤器拼接；状态写入为条件更新，
//! where 携带期望的当前状态。

use crate::error::StorageError;
use crate::filter::{push_allow_list, push_pagination, push_region_scope};
use crate::models::{RequestContentUpdate, RequestQuery, RequestRecord, RequestStatusChange};
use crate::postgres::{ADDRESS_COLUMNS, address_from_row};
use crate::traits::RequestStore;
use domain::{AllowList, RegionScope, RequestStatus};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

fn request_columns() -> String {
    format!(
        "request_id, user_id, category, type_id, description, contact_first_name, \
         contact_last_name, contact_phone, status, rejection_reason, closing_note, \
         cancel_reason, assigned_admin, {ADDRESS_COLUMNS}, created_at_ms"
    )
}

pub struct PgRequestStore {
    pub pool: PgPool,
}

impl PgRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_request_row(row: &PgRow) -> Result<RequestRecord, StorageError> {
    let status_text: String = row.try_get("status")?;
    let status = RequestStatus::parse(&status_text)
        .ok_or_else(|| StorageError::new(format!("invalid request status: {status_text}")))?;
    Ok(RequestRecord {
        request_id: row.try_get("request_id")?,
        user_id: row.try_get("user_id")?,
        category: row.try_get("category")?,
        type_id: row.try_get("type_id")?,
        description: row.try_get("description")?,
        contact_first_name: row.try_get("contact_first_name")?,
        contact_last_name: row.try_get("contact_last_name")?,
        contact_phone: row.try_get("contact_phone")?,
        status,
        rejection_reason: row.try_get("rejection_reason")?,
        closing_note: row.try_get("closing_note")?,
        cancel_reason: row.try_get("cancel_reason")?,
        assigned_admin: row.try_get("assigned_admin")?,
        address: address_from_row(row)?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

/// 普通条件 ∧ 区域谓词 ∧ 白名单。
fn push_filters<'q>(builder: &mut QueryBuilder<'q, Postgres>, query: &'q RequestQuery) {
    if let Some(status) = query.status {
        builder.push(" and status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(category) = &query.category {
        builder.push(" and category = ");
        builder.push_bind(category);
    }
    if let Some(type_id) = &query.type_id {
        builder.push(" and type_id = ");
        builder.push_bind(type_id);
    }
    push_region_scope(builder, &query.scope);
    push_allow_list(builder, "type_id", &query.allowed);
}

#[async_trait::async_trait]
impl RequestStore for PgRequestStore {
    /// 创建工单
    async fn create_request(&self, record: RequestRecord) -> Result<RequestRecord, StorageError> {
        sqlx::query(
            "insert into requests (request_id, user_id, category, type_id, description, \
             contact_first_name, contact_last_name, contact_phone, status, rejection_reason, \
             closing_note, cancel_reason, assigned_admin, address_region, address_district, \
             address_neighborhood, address_street, address_neighborhood_custom, \
             address_street_custom, address_house_number, address_apartment, created_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22)",
        )
        .bind(&record.request_id)
        .bind(&record.user_id)
        .bind(&record.category)
        .bind(&record.type_id)
        .bind(&record.description)
        .bind(&record.contact_first_name)
        .bind(&record.contact_last_name)
        .bind(&record.contact_phone)
        .bind(record.status.as_str())
        .bind(&record.rejection_reason)
        .bind(&record.closing_note)
        .bind(&record.cancel_reason)
        .bind(&record.assigned_admin)
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

    /// 查找工单（管理侧）
    async fn find_request(&self, request_id: &str) -> Result<Option<RequestRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from requests where request_id = $1",
            request_columns()
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_request_row).transpose()
    }

    /// 查找归属指定用户的工单
    async fn find_owned_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<Option<RequestRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from requests where request_id = $1 and user_id = $2",
            request_columns()
        ))
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_request_row).transpose()
    }

    /// 用户自己的工单列表（创建时间倒序）
    async fn list_owned_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<RequestRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {} from requests where user_id = $1 order by created_at_ms desc",
            request_columns()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_request_row).collect()
    }

    /// 管理侧分页列表
    async fn list_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<(Vec<RequestRecord>, u64), StorageError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "select {} from requests where 1=1",
            request_columns()
        ));
        push_filters(&mut builder, query);
        push_pagination(&mut builder, query.page, query.limit);
        let rows = builder.build().fetch_all(&self.pool).await?;
        let requests = rows
            .iter()
            .map(map_request_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select count(*) from requests where 1=1");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok((requests, total as u64))
    }

    /// 内容编辑
    async fn update_request_content(
        &self,
        request_id: &str,
        user_id: &str,
        update: RequestContentUpdate,
    ) -> Result<Option<RequestRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "update requests set \
             category = coalesce($1, category), \
             description = coalesce($2, description), \
             contact_first_name = coalesce($3, contact_first_name), \
             contact_last_name = coalesce($4, contact_last_name), \
             contact_phone = coalesce($5, contact_phone) \
             where request_id = $6 and user_id = $7 \
             returning {}",
            request_columns()
        ))
        .bind(update.category)
        .bind(update.description)
        .bind(update.contact_first_name)
        .bind(update.contact_last_name)
        .bind(update.contact_phone)
        .bind(request_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_request_row).transpose()
    }

    /// 条件状态写入
    async fn apply_request_change(
        &self,
        request_id: &str,
        expected: RequestStatus,
        change: RequestStatusChange,
    ) -> Result<Option<RequestRecord>, StorageError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("update requests set status = ");
        builder.push_bind(change.status.as_str());
        if let Some(admin) = change.assigned_admin {
            builder.push(", assigned_admin = ");
            builder.push_bind(admin);
        }
        if let Some(reason) = change.rejection_reason {
            builder.push(", rejection_reason = ");
            builder.push_bind(reason);
        }
        if let Some(note) = change.closing_note {
            builder.push(", closing_note = ");
            builder.push_bind(note);
        }
        if let Some(reason) = change.cancel_reason {
            builder.push(", cancel_reason = ");
            builder.push_bind(reason);
        }
        if let Some(type_id) = change.type_id {
            builder.push(", type_id = ");
            builder.push_bind(type_id);
        }
        builder.push(" where request_id = ");
        builder.push_bind(request_id);
        builder.push(" and status = ");
        builder.push_bind(expected.as_str());
        builder.push(format!(" returning {}", request_columns()));

        let row = builder.build().fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(map_request_row(&row)?)),
            None => {
                // 区分"不存在"与"状态已被并发修改"
                let exists: Option<i32> =
                    sqlx::query_scalar("select 1 from requests where request_id = $1")
                        .bind(request_id)
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
    async fn count_requests_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select status, count(*) as count from requests where 1=1");
        push_region_scope(&mut builder, scope);
        push_allow_list(&mut builder, "type_id", allowed);
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
