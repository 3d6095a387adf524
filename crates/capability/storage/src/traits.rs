//! 存储接口 Trait 定义
//!
//! 定义所有资源存储的异步接口：
//! - UserStore：用户与管理员存储
//! - RegionStore：区域树存储
//! - CatalogStore：子类型目录存储
//! - RequestStore / ServiceReportStore / MskOrderStore：三种工单存储
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 工单状态写入一律为条件写入（携带期望的当前状态）
//! - 列表/统计接口接收已构造好的可见性谓词，不自行做授权判断
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    AdminUpdate, CatalogKind, CatalogRecord, CatalogUpdate, MskOrderRecord, OrderContentUpdate,
    OrderQuery, OrderStatusChange, ProfileUpdate, RegionFilter, RegionRecord, RegionUpdate,
    ReportQuery, ReportStatusChange, RequestContentUpdate, RequestQuery, RequestRecord,
    RequestStatusChange, ServiceReportRecord, ServiceStatusCount, UserRecord,
};
use async_trait::async_trait;
use domain::{
    Address, AdminGrants, AllowList, AssignedRegion, MskOrderStatus, RegionScope, RequestStatus,
    ServiceReportStatus,
};

/// 用户存储接口
///
/// 市民自助操作与 owner 管理面共用；管理员相关方法只作用于
/// admin 角色的记录。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据 id 查找用户（中间件每请求重载用）
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 根据手机号查找用户（登录/注册查重用）
    async fn find_by_phone(&self, phone: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 创建用户
    async fn create_user(&self, record: UserRecord) -> Result<UserRecord, StorageError>;

    /// 更新口令哈希（旧格式升级用）
    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
    ) -> Result<bool, StorageError>;

    /// 更新个人资料
    async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 覆盖住址快照
    async fn set_address(
        &self,
        user_id: &str,
        address: Address,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 列出全部管理员
    async fn list_admins(&self) -> Result<Vec<UserRecord>, StorageError>;

    /// 查找指定管理员
    async fn find_admin(&self, user_id: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 更新管理员资料
    async fn update_admin(
        &self,
        user_id: &str,
        update: AdminUpdate,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 删除管理员
    async fn delete_admin(&self, user_id: &str) -> Result<bool, StorageError>;

    /// 指派/清除管理员负责区域
    async fn set_assigned_region(
        &self,
        user_id: &str,
        assigned_region: Option<AssignedRegion>,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 覆盖管理员模块授权
    async fn set_grants(
        &self,
        user_id: &str,
        grants: AdminGrants,
    ) -> Result<Option<UserRecord>, StorageError>;

    /// 市民账户总数（总览面板用）
    async fn count_citizens(&self) -> Result<u64, StorageError>;
}

/// 区域树存储接口
///
/// 提供区域节点 CRUD 与一层钻取；层级约束由 handler 依据
/// RegionLevel 校验后写入。
#[async_trait]
pub trait RegionStore: Send + Sync {
    /// 按层级/父节点列出区域（名称升序）
    async fn list_regions(&self, filter: RegionFilter) -> Result<Vec<RegionRecord>, StorageError>;

    /// 查找指定区域
    async fn find_region(&self, region_id: &str) -> Result<Option<RegionRecord>, StorageError>;

    /// 创建区域节点
    async fn create_region(&self, record: RegionRecord) -> Result<RegionRecord, StorageError>;

    /// 同名同层级同父节点是否已存在
    async fn region_exists(
        &self,
        name: &str,
        level: domain::RegionLevel,
        parent: Option<&str>,
    ) -> Result<bool, StorageError>;

    /// 更新区域节点
    async fn update_region(
        &self,
        region_id: &str,
        update: RegionUpdate,
    ) -> Result<Option<RegionRecord>, StorageError>;

    /// 删除区域节点（调用前须确认无子节点）
    async fn delete_region(&self, region_id: &str) -> Result<bool, StorageError>;

    /// 子节点数量
    async fn count_children(&self, region_id: &str) -> Result<u64, StorageError>;
}

/// 子类型目录存储接口
///
/// 诉求类型 / 服务 / 社区服务类目三类条目共用，按 kind 区分。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 列出启用的条目（名称升序）
    async fn list_active(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StorageError>;

    /// 查找指定条目
    async fn find_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
    ) -> Result<Option<CatalogRecord>, StorageError>;

    /// 按名称查重
    async fn find_by_name(
        &self,
        kind: CatalogKind,
        name: &str,
    ) -> Result<Option<CatalogRecord>, StorageError>;

    /// 创建条目
    async fn create_item(&self, record: CatalogRecord) -> Result<CatalogRecord, StorageError>;

    /// 更新条目
    async fn update_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
        update: CatalogUpdate,
    ) -> Result<Option<CatalogRecord>, StorageError>;

    /// 删除条目
    async fn delete_item(&self, kind: CatalogKind, item_id: &str) -> Result<bool, StorageError>;
}

/// 诉求工单存储接口
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 创建工单
    async fn create_request(&self, record: RequestRecord) -> Result<RequestRecord, StorageError>;

    /// 查找工单（管理侧）
    async fn find_request(&self, request_id: &str) -> Result<Option<RequestRecord>, StorageError>;

    /// 查找归属指定用户的工单
    async fn find_owned_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<Option<RequestRecord>, StorageError>;

    /// 用户自己的工单列表（创建时间倒序）
    async fn list_owned_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<RequestRecord>, StorageError>;

    /// 管理侧分页列表：普通条件 ∧ 区域谓词 ∧ 白名单
    async fn list_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<(Vec<RequestRecord>, u64), StorageError>;

    /// 内容编辑（调用前须通过 ensure_editable）
    async fn update_request_content(
        &self,
        request_id: &str,
        user_id: &str,
        update: RequestContentUpdate,
    ) -> Result<Option<RequestRecord>, StorageError>;

    /// 条件状态写入：当前状态必须等于 expected，否则 Conflict
    async fn apply_request_change(
        &self,
        request_id: &str,
        expected: RequestStatus,
        change: RequestStatusChange,
    ) -> Result<Option<RequestRecord>, StorageError>;

    /// 可见范围内按状态分组计数
    async fn count_requests_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError>;
}

/// 服务报修存储接口
#[async_trait]
pub trait ServiceReportStore: Send + Sync {
    /// 创建报修
    async fn create_report(
        &self,
        record: ServiceReportRecord,
    ) -> Result<ServiceReportRecord, StorageError>;

    /// 查找报修（管理侧）
    async fn find_report(
        &self,
        report_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError>;

    /// 查找归属指定用户的报修
    async fn find_owned_report(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError>;

    /// 用户自己的报修列表（创建时间倒序）
    async fn list_owned_reports(
        &self,
        user_id: &str,
    ) -> Result<Vec<ServiceReportRecord>, StorageError>;

    /// 管理侧分页列表
    async fn list_reports(
        &self,
        query: &ReportQuery,
    ) -> Result<(Vec<ServiceReportRecord>, u64), StorageError>;

    /// 条件状态写入
    async fn apply_report_change(
        &self,
        report_id: &str,
        expected: ServiceReportStatus,
        change: ReportStatusChange,
    ) -> Result<Option<ServiceReportRecord>, StorageError>;

    /// 可见范围内按状态分组计数
    async fn count_reports_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError>;

    /// 可见范围内按 (服务, 状态) 分组计数；service_id 限定单个服务
    async fn count_reports_by_service(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
        service_id: Option<&str>,
    ) -> Result<Vec<ServiceStatusCount>, StorageError>;
}

/// 社区服务订单存储接口
#[async_trait]
pub trait MskOrderStore: Send + Sync {
    /// 创建订单
    async fn create_order(&self, record: MskOrderRecord) -> Result<MskOrderRecord, StorageError>;

    /// 查找订单（管理侧）
    async fn find_order(&self, order_id: &str) -> Result<Option<MskOrderRecord>, StorageError>;

    /// 查找归属指定用户的订单
    async fn find_owned_order(
        &self,
        order_id: &str,
        user_id: &str,
    ) -> Result<Option<MskOrderRecord>, StorageError>;

    /// 用户自己的订单列表（创建时间倒序）
    async fn list_owned_orders(&self, user_id: &str)
    -> Result<Vec<MskOrderRecord>, StorageError>;

    /// 管理侧分页列表
    async fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<(Vec<MskOrderRecord>, u64), StorageError>;

    /// 内容编辑（调用前须通过 ensure_editable）
    async fn update_order_content(
        &self,
        order_id: &str,
        user_id: &str,
        update: OrderContentUpdate,
    ) -> Result<Option<MskOrderRecord>, StorageError>;

    /// 条件状态写入
    async fn apply_order_change(
        &self,
        order_id: &str,
        expected: MskOrderStatus,
        change: OrderStatusChange,
    ) -> Result<Option<MskOrderRecord>, StorageError>;

    /// 可见范围内按状态分组计数
    async fn count_orders_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError>;
}
