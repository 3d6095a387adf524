pub mod permissions;
pub mod region;
pub mod scope;
pub mod status;

pub use permissions::{
    AccessLevel, AdminGrants, AllowList, Module, ModuleGrant, PermissionError, RequiredAccess,
    effective_access, evaluate,
};
pub use region::{Address, RegionLevel};
pub use scope::{RegionScope, scope_filter};
pub use status::{MskOrderStatus, RequestStatus, ServiceReportStatus};

use serde::{Deserialize, Serialize};

/// 行为主体：经过认证的调用方及其决策所需的全部角色信息。
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
    pub role: Role,
}

/// 角色的封闭和类型：下游消费方不再对松散对象做空值防御。
#[derive(Debug, Clone)]
pub enum Role {
    Owner,
    Admin(AdminProfile),
    User,
}

/// 管理员的委托范围：负责区域 + 模块授权。
#[derive(Debug, Clone, Default)]
pub struct AdminProfile {
    pub assigned_region: Option<AssignedRegion>,
    pub grants: AdminGrants,
}

/// 管理员被指派的区域节点及其层级。
///
/// 不变式：`level` 必须等于被引用区域节点的实际层级，由 owner 指派时校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedRegion {
    pub region: String,
    pub level: RegionLevel,
}

/// 存储侧的角色标识（不携带授权载荷）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Owner,
    Admin,
    User,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Owner => "owner",
            RoleKind::Admin => "admin",
            RoleKind::User => "user",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(RoleKind::Owner),
            "admin" => Some(RoleKind::Admin),
            "user" => Some(RoleKind::User),
            _ => None,
        }
    }
}

impl Principal {
    /// 管理员的指派区域；其他角色恒为 None。
    pub fn assigned_region(&self) -> Option<&AssignedRegion> {
        match &self.role {
            Role::Admin(profile) => profile.assigned_region.as_ref(),
            _ => None,
        }
    }

    pub fn role_kind(&self) -> RoleKind {
        match self.role {
            Role::Owner => RoleKind::Owner,
            Role::Admin(_) => RoleKind::Admin,
            Role::User => RoleKind::User,
        }
    }
}
