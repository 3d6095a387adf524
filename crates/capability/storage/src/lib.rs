//! # Civic Storage 模块
//!
//! 本模块提供统一的数据存储抽象层，支持多种存储后端实现。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：定义所有资源存储的异步 Trait 接口
//! 2. **数据模型层** (`models.rs`)：定义存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型（含并发冲突）
//! 4. **过滤器构造层** (`filter.rs`)：区域范围与白名单谓词的 SQL 渲染
//! 5. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 6. **实现层**：
//!    - `in_memory/`：内存存储实现（用于测试和本地演示）
//!    - `postgres/`：PostgreSQL 存储实现（生产环境使用）
//!
//! ## 核心特性
//!
//! - **可见性过滤**：所有工单列表/统计查询统一拼接区域范围谓词
//!   （四字段任一相等或指定层级相等）与子类型白名单（IN 子句），
//!   两者与状态/子类型等普通条件取交集
//! - **条件状态写入**：状态迁移携带期望的当前状态，命中失败返回
//!   [`StorageError::Conflict`]，杜绝并发迁移互相覆盖
//! - **偏移分页**：列表查询返回 (记录, 总数)，由上层换算页数
//! - **类型安全**：状态、层级、角色均以领域枚举进出存储层
//!
//! ## 数据模型
//!
//! - **UserRecord**：用户（市民 / 管理员 / owner，含指派区域与模块授权）
//! - **RegionRecord**：四级区域树节点
//! - **CatalogRecord**：子类型目录（诉求类型 / 服务 / 社区服务类目）
//! - **RequestRecord / ServiceReportRecord / MskOrderRecord**：三种工单
//!
//! ## 设计约束
//!
//! - Handler 层禁止直接写 SQL，统一通过 storage 层
//! - 所有 SQL 使用参数绑定，动态过滤器经 QueryBuilder 拼接

// 模块导出：将子模块的内容导出到 crate 根目录
pub mod connection;
pub mod error;
pub mod filter;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;

// 导出常用类型到 crate 根目录，方便外部引用
pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;

// 导出内存存储实现类型
pub use in_memory::{
    InMemoryCatalogStore, InMemoryMskOrderStore, InMemoryRegionStore, InMemoryRequestStore,
    InMemoryServiceReportStore, InMemoryUserStore,
};

// 导出 PostgreSQL 存储实现类型
pub use postgres::{
    PgCatalogStore, PgMskOrderStore, PgRegionStore, PgRequestStore, PgServiceReportStore,
    PgUserStore,
};
