//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：auth_error, forbidden_error, module_disabled_error,
//!   read_only_error, region_forbidden_error, bad_request_error,
//!   not_found_error, conflict_error, lifecycle_error, storage_error
//! - DTO 转换：user_to_dto, admin_to_dto, region_to_dto, catalog_to_dto,
//!   request_to_dto, report_to_dto, order_to_dto
//!
//! 设计原则：
//! - 所有错误返回统一的 ApiResponse 格式
//! - HTTP 状态码与错误码对应（迁移类失败 400，并发冲突 409）
//! - DTO 转换保持 Record 和 DTO 字段一致

use api_contract::{
    AddressDto, AdminDto, ApiResponse, AssignedRegionDto, CatalogItemDto, GrantsDto, ModuleGrantDto,
    MskOrderDto, RegionDto, RequestDto, ServiceReportDto, UserDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use civic_auth::AuthError;
use civic_storage::{
    CatalogRecord, MskOrderRecord, RegionRecord, RequestRecord, ServiceReportRecord, StorageError,
    UserRecord,
};
use civic_workflow::LifecycleError;
use domain::{Address, AdminGrants, ModuleGrant};

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error("AUTH.UNAUTHORIZED", "unauthorized")),
    )
        .into_response()
}

/// 角色禁止访问错误响应
pub fn forbidden_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error("AUTH.FORBIDDEN", "forbidden")),
    )
        .into_response()
}

/// 模块关停错误响应
pub fn module_disabled_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            "PERMISSION.MODULE_DISABLED",
            "module access disabled",
        )),
    )
        .into_response()
}

/// 只读权限错误响应
pub fn read_only_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            "PERMISSION.READ_ONLY",
            "read-only access",
        )),
    )
        .into_response()
}

/// 区域越权错误响应
pub fn region_forbidden_error() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(
            "REGION.FORBIDDEN",
            "region not permitted",
        )),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 并发迁移冲突错误响应
pub fn conflict_error() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ApiResponse::<()>::error(
            "LIFECYCLE.CONFLICT",
            "status changed concurrently",
        )),
    )
        .into_response()
}

/// 生命周期校验失败响应
pub fn lifecycle_error(err: LifecycleError) -> Response {
    let code = match &err {
        LifecycleError::InvalidTransition { .. } => "LIFECYCLE.INVALID_TRANSITION",
        LifecycleError::MissingReason => "LIFECYCLE.MISSING_REASON",
        LifecycleError::NotEditable => "LIFECYCLE.NOT_EDITABLE",
    };
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(code, err.to_string())),
    )
        .into_response()
}

/// 认证内部错误响应
pub fn internal_auth_error(err: AuthError) -> Response {
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 存储错误响应；并发冲突单独映射为 409
pub fn storage_error(err: StorageError) -> Response {
    if err.is_conflict() {
        return conflict_error();
    }
    let message = err.to_string();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// Address 转 AddressDto
pub fn address_to_dto(address: &Address) -> AddressDto {
    AddressDto {
        region: address.region.clone(),
        district: address.district.clone(),
        neighborhood: address.neighborhood.clone(),
        street: address.street.clone(),
        neighborhood_custom: address.neighborhood_custom.clone(),
        street_custom: address.street_custom.clone(),
        house_number: address.house_number.clone(),
        apartment: address.apartment.clone(),
    }
}

/// UserRecord 转 UserDto
pub fn user_to_dto(record: UserRecord) -> UserDto {
    UserDto {
        user_id: record.user_id,
        phone: record.phone,
        first_name: record.first_name,
        last_name: record.last_name,
        role: record.role.as_str().to_string(),
        is_active: record.is_active,
        address: record.address.as_ref().map(address_to_dto),
    }
}

/// UserRecord 转 AdminDto（含指派区域与模块授权）
pub fn admin_to_dto(record: UserRecord) -> AdminDto {
    AdminDto {
        user_id: record.user_id,
        phone: record.phone,
        first_name: record.first_name,
        last_name: record.last_name,
        alias: record.alias,
        is_active: record.is_active,
        assigned_region: record.assigned_region.map(|assigned| AssignedRegionDto {
            region: assigned.region,
            level: assigned.level.as_str().to_string(),
        }),
        permissions: record.grants.as_ref().map(grants_to_dto),
    }
}

/// AdminGrants 转 GrantsDto
pub fn grants_to_dto(grants: &AdminGrants) -> GrantsDto {
    GrantsDto {
        requests: grants.requests.as_ref().map(grant_to_dto),
        services: grants.services.as_ref().map(grant_to_dto),
        msk: grants.msk.as_ref().map(grant_to_dto),
    }
}

fn grant_to_dto(grant: &ModuleGrant) -> ModuleGrantDto {
    ModuleGrantDto {
        access: grant.access.as_str().to_string(),
        allowed: grant.allowed.clone(),
    }
}

/// RegionRecord 转 RegionDto
pub fn region_to_dto(record: RegionRecord) -> RegionDto {
    RegionDto {
        region_id: record.region_id,
        name: record.name,
        level: record.level.as_str().to_string(),
        parent: record.parent,
        is_active: record.is_active,
    }
}

/// CatalogRecord 转 CatalogItemDto
pub fn catalog_to_dto(record: CatalogRecord) -> CatalogItemDto {
    CatalogItemDto {
        item_id: record.item_id,
        name: record.name,
        icon: record.icon,
        is_active: record.is_active,
    }
}

/// RequestRecord 转 RequestDto
pub fn request_to_dto(record: RequestRecord) -> RequestDto {
    RequestDto {
        request_id: record.request_id,
        user_id: record.user_id,
        category: record.category,
        type_id: record.type_id,
        description: record.description,
        contact_first_name: record.contact_first_name,
        contact_last_name: record.contact_last_name,
        contact_phone: record.contact_phone,
        status: record.status.as_str().to_string(),
        rejection_reason: record.rejection_reason,
        closing_note: record.closing_note,
        cancel_reason: record.cancel_reason,
        assigned_admin: record.assigned_admin,
        address: address_to_dto(&record.address),
        created_at_ms: record.created_at_ms,
    }
}

/// ServiceReportRecord 转 ServiceReportDto
pub fn report_to_dto(record: ServiceReportRecord) -> ServiceReportDto {
    ServiceReportDto {
        report_id: record.report_id,
        service_id: record.service_id,
        user_id: record.user_id,
        status: record.status.as_str().to_string(),
        resolved_by_admin: record.resolved_by_admin,
        confirmed_by_user: record.confirmed_by_user,
        rejection_reason: record.rejection_reason,
        cancel_reason: record.cancel_reason,
        admin_note: record.admin_note,
        address: address_to_dto(&record.address),
        created_at_ms: record.created_at_ms,
    }
}

/// MskOrderRecord 转 MskOrderDto
pub fn order_to_dto(record: MskOrderRecord) -> MskOrderDto {
    MskOrderDto {
        order_id: record.order_id,
        category_id: record.category_id,
        user_id: record.user_id,
        description: record.description,
        contact_first_name: record.contact_first_name,
        contact_last_name: record.contact_last_name,
        contact_phone: record.contact_phone,
        status: record.status.as_str().to_string(),
        rejection_reason: record.rejection_reason,
        cancel_reason: record.cancel_reason,
        assigned_admin: record.assigned_admin,
        confirmed_by_user: record.confirmed_by_user,
        address: address_to_dto(&record.address),
        created_at_ms: record.created_at_ms,
    }
}
