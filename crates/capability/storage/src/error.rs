//! 存储层错误类型
//!
//! 统一封装底层错误，并把并发状态冲突单列为可识别的变体，
//! 上层据此映射为 409 而非笼统的 500。

/// 存储错误。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{0}")]
    Backend(String),
    /// 条件状态写入未命中：期望的当前状态已被并发迁移修改。
    #[error("status changed concurrently")]
    Conflict,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        StorageError::Backend(message.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}
