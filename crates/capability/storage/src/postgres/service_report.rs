//! Postgres 服务报修存储实现

use crate::error::StorageError;
use crate::filter::{push_allow_list, push_pagination, push_region_scope};
use crate::models::{ReportQuery, ReportStatusChange, ServiceReportRecord, ServiceStatusCount};
use crate::postgres::{ADDRESS_COLUMNS, address_from_row};
use crate::traits::ServiceReportStore;
use domain::{AllowList, RegionScope, ServiceReportStatus};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

fn report_columns() -> String {
    format!(
        "report_id, service_id, user_id, status, resolved_by_admin, confirmed_by_user, \
         rejection_reason, cancel_reason, admin_note, {ADDRESS_COLUMNS}, created_at_ms"
    )
}

pub struct PgServiceReportStore {
    pub pool: PgPool,
}

impl PgServiceReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_report_row(row: &PgRow) -> Result<ServiceReportRecord, StorageError> {
    let status_text: String = row.try_get("status")?;
    let status = ServiceReportStatus::parse(&status_text)
        .ok_or_else(|| StorageError::new(format!("invalid report status: {status_text}")))?;
    Ok(ServiceReportRecord {
        report_id: row.try_get("report_id")?,
        service_id: row.try_get("service_id")?,
        user_id: row.try_get("user_id")?,
        status,
        resolved_by_admin: row.try_get("resolved_by_admin")?,
        confirmed_by_user: row.try_get("confirmed_by_user")?,
        rejection_reason: row.try_get("rejection_reason")?,
        cancel_reason: row.try_get("cancel_reason")?,
        admin_note: row.try_get("admin_note")?,
        address: address_from_row(row)?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

fn push_filters<'q>(builder: &mut QueryBuilder<'q, Postgres>, query: &'q ReportQuery) {
    if let Some(status) = query.status {
        builder.push(" and status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(service_id) = &query.service_id {
        builder.push(" and service_id = ");
        builder.push_bind(service_id);
    }
    push_region_scope(builder, &query.scope);
    push_allow_list(builder, "service_id", &query.allowed);
}

#[async_trait::async_trait]
impl ServiceReportStore for PgServiceReportStore {
    /// 创建报修
    async fn create_report(
        &self,
        record: ServiceReportRecord,
    ) -> Result<ServiceReportRecord, StorageError> {
        sqlx::query(
            "insert into service_reports (report_id, service_id, user_id, status, \
             resolved_by_admin, confirmed_by_user, rejection_reason, cancel_reason, admin_note, \
             address_region, address_district, address_neighborhood, address_street, \
             address_neighborhood_custom, address_street_custom, address_house_number, \
             address_apartment, created_at_ms) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18)",
        )
        .bind(&record.report_id)
        .bind(&record.service_id)
        .bind(&record.user_id)
        .bind(record.status.as_str())
        .bind(&record.resolved_by_admin)
        .bind(record.confirmed_by_user)
        .bind(&record.rejection_reason)
        .bind(&record.cancel_reason)
        .bind(&record.admin_note)
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

    /// 查找报修（管理侧）
    async fn find_report(
        &self,
        report_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from service_reports where report_id = $1",
            report_columns()
        ))
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_report_row).transpose()
    }

    /// 查找归属指定用户的报修
    async fn find_owned_report(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        let row = sqlx::query(&format!(
            "select {} from service_reports where report_id = $1 and user_id = $2",
            report_columns()
        ))
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_report_row).transpose()
    }

    /// 用户自己的报修列表（创建时间倒序）
    async fn list_owned_reports(
        &self,
        user_id: &str,
    ) -> Result<Vec<ServiceReportRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "select {} from service_reports where user_id = $1 order by created_at_ms desc",
            report_columns()
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_report_row).collect()
    }

    /// 管理侧分页列表
    async fn list_reports(
        &self,
        query: &ReportQuery,
    ) -> Result<(Vec<ServiceReportRecord>, u64), StorageError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "select {} from service_reports where 1=1",
            report_columns()
        ));
        push_filters(&mut builder, query);
        push_pagination(&mut builder, query.page, query.limit);
        let rows = builder.build().fetch_all(&self.pool).await?;
        let reports = rows
            .iter()
            .map(map_report_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select count(*) from service_reports where 1=1");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok((reports, total as u64))
    }

    /// 条件状态写入
    async fn apply_report_change(
        &self,
        report_id: &str,
        expected: ServiceReportStatus,
        change: ReportStatusChange,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("update service_reports set status = ");
        builder.push_bind(change.status.as_str());
        if let Some(admin) = change.resolved_by_admin {
            builder.push(", resolved_by_admin = ");
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
        if let Some(note) = change.admin_note {
            builder.push(", admin_note = ");
            builder.push_bind(note);
        }
        builder.push(" where report_id = ");
        builder.push_bind(report_id);
        builder.push(" and status = ");
        builder.push_bind(expected.as_str());
        builder.push(format!(" returning {}", report_columns()));

        let row = builder.build().fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(map_report_row(&row)?)),
            None => {
                // 区分"不存在"与"状态已被并发修改"
                let exists: Option<i32> =
                    sqlx::query_scalar("select 1 from service_reports where report_id = $1")
                        .bind(report_id)
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
    async fn count_reports_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("select status, count(*) as count from service_reports where 1=1");
        push_region_scope(&mut builder, scope);
        push_allow_list(&mut builder, "service_id", allowed);
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

    /// 可见范围内按 (服务, 状态) 分组计数
    async fn count_reports_by_service(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
        service_id: Option<&str>,
    ) -> Result<Vec<ServiceStatusCount>, StorageError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "select service_id, status, count(*) as count from service_reports where 1=1",
        );
        if let Some(service_id) = service_id {
            builder.push(" and service_id = ");
            builder.push_bind(service_id.to_string());
        }
        push_region_scope(&mut builder, scope);
        push_allow_list(&mut builder, "service_id", allowed);
        builder.push(" group by service_id, status order by service_id");
        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status_text: String = row.try_get("status")?;
            let status = ServiceReportStatus::parse(&status_text).ok_or_else(|| {
                StorageError::new(format!("invalid report status: {status_text}"))
            })?;
            let count: i64 = row.try_get("count")?;
            counts.push(ServiceStatusCount {
                service_id: row.try_get("service_id")?,
                status,
                count: count as u64,
            });
        }
        Ok(counts)
    }
}
