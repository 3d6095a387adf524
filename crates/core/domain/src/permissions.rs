//! 模块级权限评估
//!
//! owner 将三个业务模块（requests / services / msk）按模块粒度委托给
//! 管理员，每个模块可设访问级别和子类型白名单。本模块只做纯决策，
//! 不触达存储；调用方把返回的白名单拼进后续查询过滤器。

use crate::{Principal, Role};
use serde::{Deserialize, Serialize};

/// 业务模块：按模块粒度授权给管理员。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Requests,
    Services,
    Msk,
}

impl Module {
    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Requests => "requests",
            Module::Services => "services",
            Module::Msk => "msk",
        }
    }
}

/// 模块访问级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Off,
    Read,
    Manage,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Off => "off",
            AccessLevel::Read => "read",
            AccessLevel::Manage => "manage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(AccessLevel::Off),
            "read" => Some(AccessLevel::Read),
            "manage" => Some(AccessLevel::Manage),
            _ => None,
        }
    }
}

/// 操作要求的最低访问级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredAccess {
    Read,
    Manage,
}

/// 单个模块的授权条目。
///
/// `allowed` 为子类型白名单；空表等价于不限。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrant {
    pub access: AccessLevel,
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// 管理员的模块授权集合。
///
/// 条目缺失表示历史默认：完全访问、无白名单。该默认通过
/// [`effective_access`] 显式表达，不得被悄悄收紧。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGrants {
    pub requests: Option<ModuleGrant>,
    pub services: Option<ModuleGrant>,
    pub msk: Option<ModuleGrant>,
}

impl AdminGrants {
    pub fn module(&self, module: Module) -> Option<&ModuleGrant> {
        match module {
            Module::Requests => self.requests.as_ref(),
            Module::Services => self.services.as_ref(),
            Module::Msk => self.msk.as_ref(),
        }
    }
}

/// 评估通过后随决策返回的子类型白名单。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowList {
    /// 全部子类型可见。
    Unrestricted,
    /// 封闭白名单，与其他查询条件取交集。
    Only(Vec<String>),
}

impl AllowList {
    /// 空 id 列表等价于不限。
    pub fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            AllowList::Unrestricted
        } else {
            AllowList::Only(ids)
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, AllowList::Unrestricted)
    }

    pub fn permits(&self, id: &str) -> bool {
        match self {
            AllowList::Unrestricted => true,
            AllowList::Only(ids) => ids.iter().any(|allowed| allowed == id),
        }
    }
}

/// 权限拒绝原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    #[error("role not permitted")]
    ForbiddenRole,
    #[error("module access disabled")]
    ModuleDisabled,
    #[error("read-only access")]
    ReadOnly,
}

/// 授权条目缺失时的有效访问级别（总函数，缺省即 manage）。
pub fn effective_access(entry: Option<&ModuleGrant>) -> AccessLevel {
    entry.map(|grant| grant.access).unwrap_or(AccessLevel::Manage)
}

/// 评估主体对模块的访问请求。
///
/// owner 恒通过且不限白名单；user 角色恒被拒；管理员按
/// [`effective_access`] 与要求级别比对，通过时返回该模块的白名单。
pub fn evaluate(
    principal: &Principal,
    module: Module,
    required: RequiredAccess,
) -> Result<AllowList, PermissionError> {
    let profile = match &principal.role {
        Role::Owner => return Ok(AllowList::Unrestricted),
        Role::Admin(profile) => profile,
        Role::User => return Err(PermissionError::ForbiddenRole),
    };

    let entry = profile.grants.module(module);
    match effective_access(entry) {
        AccessLevel::Off => Err(PermissionError::ModuleDisabled),
        AccessLevel::Read if required == RequiredAccess::Manage => Err(PermissionError::ReadOnly),
        _ => Ok(AllowList::from_ids(
            entry.map(|grant| grant.allowed.clone()).unwrap_or_default(),
        )),
    }
}
