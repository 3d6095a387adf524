//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 偏移分页的列表响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit))
        };
        Self {
            data,
            total,
            page,
            pages,
        }
    }
}

/// 按状态分组的计数（total + 每个状态一个键）。
#[derive(Debug, Default, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
}

impl StatusCounts {
    pub fn from_counts(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        let mut result = StatusCounts::default();
        for (status, count) in counts {
            result.total += count;
            result.counts.insert(status, count);
        }
        result
    }
}

// ============================================================================
// 认证与用户
// ============================================================================

/// 注册请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub phone: String,
    pub password: String,
}

/// 登录请求体（普通用户与管理端共用）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// 登录/注册响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

/// 用户返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub user_id: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<AddressDto>,
}

/// 地址快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub region: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub neighborhood_custom: String,
    pub street_custom: String,
    pub house_number: String,
    pub apartment: String,
}

/// 个人资料更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// 住址设置请求体（region 与 district 必填）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAddressRequest {
    pub region: String,
    pub district: String,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub neighborhood_custom: Option<String>,
    pub street_custom: Option<String>,
    pub house_number: Option<String>,
    pub apartment: Option<String>,
}

// ============================================================================
// 区域
// ============================================================================

/// 区域列表查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionListQuery {
    pub level: Option<String>,
    pub parent: Option<String>,
}

/// 区域节点返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionDto {
    pub region_id: String,
    pub name: String,
    pub level: String,
    pub parent: Option<String>,
    pub is_active: bool,
}

/// 区域节点创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionRequest {
    pub name: String,
    pub level: String,
    pub parent: Option<String>,
}

/// 区域节点更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegionRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

// ============================================================================
// 子类型目录（诉求类型 / 服务 / 社区服务类目）
// ============================================================================

/// 目录条目返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemDto {
    pub item_id: String,
    pub name: String,
    pub icon: String,
    pub is_active: bool,
}

/// 目录条目创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogItemRequest {
    pub name: String,
    pub icon: Option<String>,
}

/// 目录条目更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogItemRequest {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

// ============================================================================
// 管理员管理（owner 专用）
// ============================================================================

/// 管理员返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDto {
    pub user_id: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub alias: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_region: Option<AssignedRegionDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<GrantsDto>,
}

/// 指派区域结构（请求与响应共用）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedRegionDto {
    pub region: String,
    pub level: String,
}

/// 模块授权结构（请求与响应共用）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleGrantDto {
    pub access: String,
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// 管理员的模块授权集合。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantsDto {
    pub requests: Option<ModuleGrantDto>,
    pub services: Option<ModuleGrantDto>,
    pub msk: Option<ModuleGrantDto>,
}

/// 管理员创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub phone: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub alias: String,
}

/// 管理员更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub alias: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// 指派区域请求体；null 表示清除指派。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRegionRequest {
    pub assigned_region: Option<AssignedRegionDto>,
}

/// 模块授权更新请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionsRequest {
    pub permissions: GrantsDto,
}

// ============================================================================
// 诉求工单
// ============================================================================

/// 诉求工单创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestRequest {
    pub category: String,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
}

/// 诉求工单内容编辑请求体（仅初始状态）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// 诉求工单状态更新请求体（管理侧）。
///
/// `type` 为双层 Option：缺省不改，显式 null 清空分类。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestStatusRequest {
    pub status: String,
    pub rejection_reason: Option<String>,
    pub closing_note: Option<String>,
    #[serde(rename = "type", default, with = "double_option")]
    pub type_id: Option<Option<String>>,
}

/// 区分"字段缺省"与"显式 null"的反序列化辅助。
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

/// 用户取消请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTicketRequest {
    pub cancel_reason: Option<String>,
}

/// 用户确认请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTicketRequest {
    pub confirmed: bool,
}

/// 诉求工单列表查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub region_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 诉求工单统计查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsScopeQuery {
    pub region_id: Option<String>,
}

/// 诉求工单返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub request_id: String,
    pub user_id: String,
    pub category: String,
    #[serde(rename = "type")]
    pub type_id: Option<String>,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
    pub status: String,
    pub rejection_reason: String,
    pub closing_note: String,
    pub cancel_reason: String,
    pub assigned_admin: Option<String>,
    pub address: AddressDto,
    pub created_at_ms: i64,
}

// ============================================================================
// 服务报修
// ============================================================================

/// 服务报修创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceReportRequest {
    pub service_id: String,
}

/// 服务报修状态更新请求体（管理侧）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReportStatusRequest {
    pub status: String,
    pub rejection_reason: Option<String>,
    pub admin_note: Option<String>,
}

/// 服务报修列表查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub status: Option<String>,
    pub service_id: Option<String>,
    pub region_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 按服务统计的查询参数：层级从细到粗取第一个命中。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatsQuery {
    pub region_id: Option<String>,
    pub district_id: Option<String>,
    pub neighborhood_id: Option<String>,
    pub service_id: Option<String>,
}

/// 服务报修返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReportDto {
    pub report_id: String,
    pub service_id: String,
    pub user_id: String,
    pub status: String,
    pub resolved_by_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub rejection_reason: String,
    pub cancel_reason: String,
    pub admin_note: String,
    pub address: AddressDto,
    pub created_at_ms: i64,
}

// ============================================================================
// 社区服务订单
// ============================================================================

/// 社区服务订单创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMskOrderRequest {
    pub category_id: String,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
}

/// 社区服务订单内容编辑请求体（仅初始状态）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMskOrderRequest {
    pub description: Option<String>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub contact_phone: Option<String>,
}

/// 社区服务订单状态更新请求体（管理侧）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: String,
    pub rejection_reason: Option<String>,
}

/// 社区服务订单列表查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub category_id: Option<String>,
    pub region_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 社区服务订单返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MskOrderDto {
    pub order_id: String,
    pub category_id: String,
    pub user_id: String,
    pub description: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_phone: String,
    pub status: String,
    pub rejection_reason: String,
    pub cancel_reason: String,
    pub assigned_admin: Option<String>,
    pub confirmed_by_user: Option<bool>,
    pub address: AddressDto,
    pub created_at_ms: i64,
}

// ============================================================================
// 统计
// ============================================================================

/// 总览面板返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub requests: StatusCounts,
    pub service_reports: StatusCounts,
    pub msk_orders: StatusCounts,
    pub total_users: u64,
}

/// 区域钻取统计查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStatsQuery {
    pub region_id: Option<String>,
    pub region_type: Option<String>,
}

/// 区域钻取统计返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStatsDto {
    pub requests: StatusCounts,
    pub service_reports: StatusCounts,
    pub msk_orders: StatusCounts,
}

/// 按服务聚合的报修统计返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatDto {
    pub service_id: String,
    pub service_name: String,
    pub service_icon: String,
    pub total: u64,
    pub unavailable: u64,
    pub in_progress: u64,
    pub pending_confirmation: u64,
    pub confirmed: u64,
    pub rejected: u64,
    pub problem_count: u64,
    pub problem_percent: u64,
    pub available_percent: u64,
}

/// 流量计数快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDto {
    pub tickets_created: u64,
    pub transitions_applied: u64,
    pub transitions_rejected: u64,
    pub confirmations: u64,
    pub cancellations: u64,
}
