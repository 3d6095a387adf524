//! 可见性过滤器的 SQL 渲染
//!
//! 把领域层的 RegionScope / AllowList 谓词拼进 QueryBuilder：
//! - AnyField：四个地址列任一等于区域 id（$or 语义，精确相等）
//! - AtLevel：仅匹配指定层级对应的地址列
//! - Only：子类型列 = any(白名单)
//!
//! 所有值经参数绑定进入 SQL；本模块假定查询以 `where 1=1` 起头，
//! 每个条件以 ` and ...` 追加。

use domain::{AllowList, RegionLevel, RegionScope};
use sqlx::{Postgres, QueryBuilder};

/// 层级对应的工单地址列名。
pub fn address_column(level: RegionLevel) -> &'static str {
    match level {
        RegionLevel::Region => "address_region",
        RegionLevel::District => "address_district",
        RegionLevel::Neighborhood => "address_neighborhood",
        RegionLevel::Street => "address_street",
    }
}

/// 追加区域范围谓词。
pub fn push_region_scope<'q>(builder: &mut QueryBuilder<'q, Postgres>, scope: &'q RegionScope) {
    match scope {
        RegionScope::Unrestricted => {}
        RegionScope::AnyField(region_id) => {
            builder.push(" and (address_region = ");
            builder.push_bind(region_id);
            builder.push(" or address_district = ");
            builder.push_bind(region_id);
            builder.push(" or address_neighborhood = ");
            builder.push_bind(region_id);
            builder.push(" or address_street = ");
            builder.push_bind(region_id);
            builder.push(")");
        }
        RegionScope::AtLevel(level, region_id) => {
            builder.push(" and ");
            builder.push(address_column(*level));
            builder.push(" = ");
            builder.push_bind(region_id);
        }
    }
}

/// 追加子类型白名单谓词。
pub fn push_allow_list<'q>(
    builder: &mut QueryBuilder<'q, Postgres>,
    column: &str,
    allowed: &'q AllowList,
) {
    if let AllowList::Only(ids) = allowed {
        builder.push(" and ");
        builder.push(column);
        builder.push(" = any(");
        builder.push_bind(ids);
        builder.push(")");
    }
}

/// 追加偏移分页（创建时间倒序）。
pub fn push_pagination(builder: &mut QueryBuilder<'_, Postgres>, page: u32, limit: u32) {
    let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
    builder.push(" order by created_at_ms desc limit ");
    builder.push_bind(i64::from(limit));
    builder.push(" offset ");
    builder.push_bind(offset);
}
