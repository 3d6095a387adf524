//! 区域可见性过滤
//!
//! 把主体身份解析成工单查询的区域谓词。本模块只负责构造过滤器，
//! 不做授权判断：显式 regionId 的访问校验必须在调用前由区域访问
//! 门卫完成（见 civic-api 的 require_region_access）。

use crate::{Address, Principal, RegionLevel, Role};

/// 区域可见性谓词。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScope {
    /// 不限区域。
    Unrestricted,
    /// 四个地址字段任一精确等于给定区域即可见。
    ///
    /// 刻意不做层级展开：管理员指派层级与工单地址实际填充的层级
    /// 一致时才能命中，较粗层级不会向下包含更细的字段。
    AnyField(String),
    /// 仅匹配指定层级的地址字段（统计钻取用）。
    AtLevel(RegionLevel, String),
}

/// 为主体构造区域谓词。
///
/// 显式 regionId（钻取）会整体替换管理员的本区域谓词，而非叠加。
pub fn scope_filter(principal: &Principal, explicit_region: Option<&str>) -> RegionScope {
    if let Some(region_id) = explicit_region {
        return RegionScope::AnyField(region_id.to_string());
    }
    match &principal.role {
        Role::Admin(profile) => match &profile.assigned_region {
            Some(assigned) => RegionScope::AnyField(assigned.region.clone()),
            None => RegionScope::Unrestricted,
        },
        _ => RegionScope::Unrestricted,
    }
}

impl RegionScope {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, RegionScope::Unrestricted)
    }

    /// 地址是否落在谓词内（内存实现与测试用；SQL 侧由
    /// civic-storage 的过滤器构造渲染同样的语义）。
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            RegionScope::Unrestricted => true,
            RegionScope::AnyField(region_id) => [
                RegionLevel::Region,
                RegionLevel::District,
                RegionLevel::Neighborhood,
                RegionLevel::Street,
            ]
            .iter()
            .any(|level| address.field(*level) == Some(region_id.as_str())),
            RegionScope::AtLevel(level, region_id) => {
                address.field(*level) == Some(region_id.as_str())
            }
        }
    }
}
