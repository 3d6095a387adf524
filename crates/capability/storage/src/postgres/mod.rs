//! # PostgreSQL 存储实现模块
//!
//! 本模块提供所有存储接口的 PostgreSQL 实现，用于生产环境。
//!
//! ## 设计原则
//!
//! 1. **参数化查询**：所有 SQL 查询使用参数绑定，动态过滤器统一经
//!    QueryBuilder 拼接（见 `filter.rs`），禁止字符串拼接值
//! 2. **可见性过滤下推**：区域谓词与子类型白名单直接渲染进 where
//!    子句，列表与分组计数共用同一套构造逻辑
//! 3. **条件状态写入**：工单状态更新在 where 中携带期望的当前状态，
//!    未命中时区分"不存在"（None）与"并发冲突"（Conflict）
//! 4. **连接池管理**：使用连接池复用数据库连接（见 `connection.rs`）
//!
//! ## 包含的实现
//!
//! - **UserStore** (`user.rs`)：用户/管理员存储，授权与地址存 JSONB
//! - **RegionStore** (`region.rs`)：四级区域树存储
//! - **CatalogStore** (`catalog.rs`)：子类型目录存储（kind 区分）
//! - **RequestStore** (`request.rs`)：诉求工单存储
//! - **ServiceReportStore** (`service_report.rs`)：服务报修存储
//! - **MskOrderStore** (`msk_order.rs`)：社区服务订单存储
//!
//! ## 数据库模式要求
//!
//! - `users`：user_id, phone, password_hash, first_name, last_name,
//!   alias, role, is_active, assigned_region_id, assigned_region_level,
//!   grants (jsonb), address (jsonb), created_at_ms
//! - `regions`：region_id, name, level, parent_id, is_active
//! - `catalog_items`：item_id, kind, name, icon, is_active
//! - `requests` / `service_reports` / `msk_orders`：各自字段 +
//!   地址快照展开列（address_region ... address_apartment）+ created_at_ms
//!
//! ## 索引建议
//!
//! - 工单表：四个地址列各一单列索引（区域 $or 谓词）、
//!   (status, created_at_ms) 复合索引（列表常用条件）
//! - `regions`：(level, parent_id) 复合索引 + (name, level, parent_id) 唯一索引
//! - `users`：phone 唯一索引

// 导出各个 PostgreSQL 存储实现
pub mod catalog;
pub mod msk_order;
pub mod region;
pub mod request;
pub mod service_report;
pub mod user;

// 导出到 crate 根目录，方便外部引用
pub use catalog::*;
pub use msk_order::*;
pub use region::*;
pub use request::*;
pub use service_report::*;
pub use user::*;

use crate::error::StorageError;
use domain::Address;
use sqlx::{Row, postgres::PgRow};

/// 工单表共用的地址快照展开列。
pub(crate) const ADDRESS_COLUMNS: &str = "address_region, address_district, \
     address_neighborhood, address_street, address_neighborhood_custom, \
     address_street_custom, address_house_number, address_apartment";

/// 从工单行读出地址快照。
pub(crate) fn address_from_row(row: &PgRow) -> Result<Address, StorageError> {
    Ok(Address {
        region: row.try_get("address_region")?,
        district: row.try_get("address_district")?,
        neighborhood: row.try_get("address_neighborhood")?,
        street: row.try_get("address_street")?,
        neighborhood_custom: row.try_get("address_neighborhood_custom")?,
        street_custom: row.try_get("address_street_custom")?,
        house_number: row.try_get("address_house_number")?,
        apartment: row.try_get("address_apartment")?,
    })
}
