//! 数据模型
//!
//! 定义所有存储相关的数据模型和更新结构：
//! - 用户模型：UserRecord, ProfileUpdate, AdminUpdate
//! - 区域模型：RegionRecord, RegionUpdate, RegionFilter
//! - 目录模型：CatalogKind, CatalogRecord, CatalogUpdate
//! - 工单模型：RequestRecord / ServiceReportRecord / MskOrderRecord
//!   及各自的查询、内容编辑与条件状态写入结构

use domain::{
    Address, AdminGrants, AdminProfile, AllowList, AssignedRegion, MskOrderStatus, Principal,
    RegionLevel, RegionScope, RequestStatus, Role, RoleKind, ServiceReportStatus,
};

/// 用户记录（市民 / 管理员 / owner 共用一张表）。
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: String,
    pub phone: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// 管理员对市民展示的化名；其他角色为空串。
    pub alias: String,
    pub role: RoleKind,
    pub is_active: bool,
    pub assigned_region: Option<AssignedRegion>,
    /// None 表示从未配置过模块授权（历史默认：全模块 manage）。
    pub grants: Option<AdminGrants>,
    pub address: Option<Address>,
    pub created_at_ms: i64,
}

impl UserRecord {
    /// 将用户记录转换为决策用的 Principal。
    pub fn to_principal(&self) -> Principal {
        let role = match self.role {
            RoleKind::Owner => Role::Owner,
            RoleKind::User => Role::User,
            RoleKind::Admin => Role::Admin(AdminProfile {
                assigned_region: self.assigned_region.clone(),
                grants: self.grants.clone().unwrap_or_default(),
            }),
        };
        Principal {
            id: self.user_id.clone(),
            role,
        }
    }
}

/// 个人资料更新输入。
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// 管理员更新输入（owner 管理面用）。
#[derive(Debug, Clone, Default)]
pub struct AdminUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub alias: Option<String>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}

// ============================================================================
// 区域树（region → district → neighborhood → street）
// ============================================================================

/// 区域节点记录。
#[derive(Debug, Clone)]
pub struct RegionRecord {
    pub region_id: String,
    pub name: String,
    pub level: RegionLevel,
    pub parent: Option<String>,
    pub is_active: bool,
}

/// 区域节点更新输入。
#[derive(Debug, Clone, Default)]
pub struct RegionUpdate {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// 父节点过滤：按节点钻取或只取顶层。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentFilter {
    Root,
    Node(String),
}

/// 区域列表过滤条件。
#[derive(Debug, Clone, Default)]
pub struct RegionFilter {
    pub level: Option<RegionLevel>,
    pub parent: Option<ParentFilter>,
}

// ============================================================================
// 子类型目录（可被白名单引用的 ResourceId 三类来源）
// ============================================================================

/// 目录类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    RequestType,
    Service,
    MskCategory,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::RequestType => "request_type",
            CatalogKind::Service => "service",
            CatalogKind::MskCategory => "msk_category",
        }
    }
}

/// 目录条目记录。
#[derive(Debug, Clone)]
pub struct CatalogRecord {
    pub item_id: String,
    pub kind: CatalogKind,
    pub name: String,
    pub icon: String,
    pub is_active: bool,
}

/// 目录条目更新输入。
#[derive(Debug, Clone, Default)]
pub struct CatalogUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

// ============================================================================
// 诉求工单
// ============================================================================

/// 诉求工单记录。
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub request_id: String,
    pub user_id: String,
    pub category: String,
    pub type_id: Option<String>,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
    pub status: RequestStatus,
    pub rejection_reason: String,
    pub closing_note: String,
    pub cancel_reason: String,
    pub assigned_admin: Option<String>,
    pub address: Address,
    pub created_at_ms: i64,
}

/// 诉求工单内容编辑输入（仅初始状态）。
#[derive(Debug, Clone, Default)]
pub struct RequestContentUpdate {
    pub category: Option<String>,
    pub description: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// 诉求工单条件状态写入：携带迁移副作用与附注字段。
#[derive(Debug, Clone)]
pub struct RequestStatusChange {
    pub status: RequestStatus,
    pub assigned_admin: Option<String>,
    pub rejection_reason: Option<String>,
    pub closing_note: Option<String>,
    pub cancel_reason: Option<String>,
    /// Some(None) 表示清空类型。
    pub type_id: Option<Option<String>>,
}

impl RequestStatusChange {
    /// 仅改状态的基线写入，其余字段按需补齐。
    pub fn to(status: RequestStatus) -> Self {
        Self {
            status,
            assigned_admin: None,
            rejection_reason: None,
            closing_note: None,
            cancel_reason: None,
            type_id: None,
        }
    }
}

/// 诉求工单列表查询：普通条件与可见性谓词取交集。
#[derive(Debug, Clone)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub category: Option<String>,
    pub type_id: Option<String>,
    pub scope: RegionScope,
    pub allowed: AllowList,
    pub page: u32,
    pub limit: u32,
}

// ============================================================================
// 服务报修
// ============================================================================

/// 服务报修记录。
#[derive(Debug, Clone)]
pub struct ServiceReportRecord {
    pub report_id: String,
    pub service_id: String,
    pub user_id: String,
    pub status: ServiceReportStatus,
    pub resolved_by_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub rejection_reason: String,
    pub cancel_reason: String,
    pub admin_note: String,
    pub address: Address,
    pub created_at_ms: i64,
}

/// 服务报修条件状态写入。
#[derive(Debug, Clone)]
pub struct ReportStatusChange {
    pub status: ServiceReportStatus,
    pub resolved_by_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub rejection_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub admin_note: Option<String>,
}

impl ReportStatusChange {
    /// 仅改状态的基线写入，其余字段按需补齐。
    pub fn to(status: ServiceReportStatus) -> Self {
        Self {
            status,
            resolved_by_admin: None,
            confirmed_by_user: None,
            rejection_reason: None,
            cancel_reason: None,
            admin_note: None,
        }
    }
}

/// 服务报修列表查询。
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub status: Option<ServiceReportStatus>,
    pub service_id: Option<String>,
    pub scope: RegionScope,
    pub allowed: AllowList,
    pub page: u32,
    pub limit: u32,
}

/// 按服务与状态分组的计数行。
#[derive(Debug, Clone)]
pub struct ServiceStatusCount {
    pub service_id: String,
    pub status: ServiceReportStatus,
    pub count: u64,
}

// ============================================================================
// 社区服务订单
// ============================================================================

/// 社区服务订单记录。
#[derive(Debug, Clone)]
pub struct MskOrderRecord {
    pub order_id: String,
    pub category_id: String,
    pub user_id: String,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
    pub status: MskOrderStatus,
    pub rejection_reason: String,
    pub cancel_reason: String,
    pub assigned_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub address: Address,
    pub created_at_ms: i64,
}

/// 社区服务订单内容编辑输入（仅初始状态）。
#[derive(Debug, Clone, Default)]
pub struct OrderContentUpdate {
    pub description: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// 社区服务订单条件状态写入。
#[derive(Debug, Clone)]
pub struct OrderStatusChange {
    pub status: MskOrderStatus,
    pub assigned_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub rejection_reason: Option<String>,
    pub cancel_reason: Option<String>,
}

impl OrderStatusChange {
    /// 仅改状态的基线写入，其余字段按需补齐。
    pub fn to(status: MskOrderStatus) -> Self {
        Self {
            status,
            assigned_admin: None,
            confirmed_by_user: None,
            rejection_reason: None,
            cancel_reason: None,
        }
    }
}

/// 社区服务订单列表查询。
#[derive(Debug, Clone)]
pub struct OrderQuery {
    pub status: Option<MskOrderStatus>,
    pub category_id: Option<String>,
    pub scope: RegionScope,
    pub allowed: AllowList,
    pub page: u32,
    pub limit: u32,
}
