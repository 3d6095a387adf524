//! 子类型目录内存存储实现
//!
//! 仅用于本地演示和测试。三类目录条目共用一张表，按 kind 区分。

use crate::error::StorageError;
use crate::models::{CatalogKind, CatalogRecord, CatalogUpdate};
use crate::traits::CatalogStore;
use std::collections::HashMap;
use std::sync::RwLock;

/// 子类型目录内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryCatalogStore {
    items: RwLock<HashMap<String, CatalogRecord>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_active(&self, kind: CatalogKind) -> Result<Vec<CatalogRecord>, StorageError> {
        let mut items: Vec<CatalogRecord> = self
            .items
            .read()
            .map(|map| {
                map.values()
                    .filter(|item| item.kind == kind && item.is_active)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn find_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        Ok(self.items.read().ok().and_then(|map| {
            map.get(item_id)
                .filter(|item| item.kind == kind)
                .cloned()
        }))
    }

    async fn find_by_name(
        &self,
        kind: CatalogKind,
        name: &str,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        Ok(self.items.read().ok().and_then(|map| {
            map.values()
                .find(|item| item.kind == kind && item.name == name)
                .cloned()
        }))
    }

    async fn create_item(&self, record: CatalogRecord) -> Result<CatalogRecord, StorageError> {
        let mut map = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.item_id) {
            return Err(StorageError::new("item exists"));
        }
        map.insert(record.item_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_item(
        &self,
        kind: CatalogKind,
        item_id: &str,
        update: CatalogUpdate,
    ) -> Result<Option<CatalogRecord>, StorageError> {
        let mut map = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let item = match map.get_mut(item_id) {
            Some(item) if item.kind == kind => item,
            _ => return Ok(None),
        };
        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(icon) = update.icon {
            item.icon = icon;
        }
        if let Some(is_active) = update.is_active {
            item.is_active = is_active;
        }
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, kind: CatalogKind, item_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .items
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match map.get(item_id) {
            Some(item) if item.kind == kind => {
                map.remove(item_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
