//! 区域层级与地址快照
//!
//! 四级行政区划树：region → district → neighborhood → street。
//! 父节点层级恰好比子节点高一级；只有 region 层级允许无父节点。

use serde::{Deserialize, Serialize};

/// 区域树层级。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLevel {
    Region,
    District,
    Neighborhood,
    Street,
}

impl RegionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLevel::Region => "region",
            RegionLevel::District => "district",
            RegionLevel::Neighborhood => "neighborhood",
            RegionLevel::Street => "street",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "region" => Some(RegionLevel::Region),
            "district" => Some(RegionLevel::District),
            "neighborhood" => Some(RegionLevel::Neighborhood),
            "street" => Some(RegionLevel::Street),
            _ => None,
        }
    }

    /// 下一级；street 为叶子。
    pub fn child(&self) -> Option<RegionLevel> {
        match self {
            RegionLevel::Region => Some(RegionLevel::District),
            RegionLevel::District => Some(RegionLevel::Neighborhood),
            RegionLevel::Neighborhood => Some(RegionLevel::Street),
            RegionLevel::Street => None,
        }
    }

    /// 上一级；region 为根。
    pub fn parent(&self) -> Option<RegionLevel> {
        match self {
            RegionLevel::Region => None,
            RegionLevel::District => Some(RegionLevel::Region),
            RegionLevel::Neighborhood => Some(RegionLevel::District),
            RegionLevel::Street => Some(RegionLevel::Neighborhood),
        }
    }
}

/// 地址快照。
///
/// 提交工单时从用户档案整体复制；四个区域引用相互独立存储，
/// 不是计算出的祖先链。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub region: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    #[serde(default)]
    pub neighborhood_custom: String,
    #[serde(default)]
    pub street_custom: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub apartment: String,
}

impl Address {
    /// 指定层级的区域引用。
    pub fn field(&self, level: RegionLevel) -> Option<&str> {
        match level {
            RegionLevel::Region => self.region.as_deref(),
            RegionLevel::District => self.district.as_deref(),
            RegionLevel::Neighborhood => self.neighborhood.as_deref(),
            RegionLevel::Street => self.street.as_deref(),
        }
    }
}
