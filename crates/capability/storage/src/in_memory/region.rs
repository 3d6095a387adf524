//! 区域树内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{ParentFilter, RegionFilter, RegionRecord, RegionUpdate};
use crate::traits::RegionStore;
use domain::RegionLevel;
use std::collections::HashMap;
use std::sync::RwLock;

/// 区域树内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryRegionStore {
    regions: RwLock<HashMap<String, RegionRecord>>,
}

impl InMemoryRegionStore {
    pub fn new() -> Self {
        Self {
            regions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRegionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_matches(record: &RegionRecord, filter: &RegionFilter) -> bool {
    if let Some(level) = filter.level {
        if record.level != level {
            return false;
        }
    }
    match &filter.parent {
        None => true,
        Some(ParentFilter::Root) => record.parent.is_none(),
        Some(ParentFilter::Node(parent_id)) => record.parent.as_deref() == Some(parent_id),
    }
}

#[async_trait::async_trait]
impl RegionStore for InMemoryRegionStore {
    async fn list_regions(&self, filter: RegionFilter) -> Result<Vec<RegionRecord>, StorageError> {
        let mut regions: Vec<RegionRecord> = self
            .regions
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| filter_matches(record, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(regions)
    }

    async fn find_region(&self, region_id: &str) -> Result<Option<RegionRecord>, StorageError> {
        Ok(self
            .regions
            .read()
            .ok()
            .and_then(|map| map.get(region_id).cloned()))
    }

    async fn create_region(&self, record: RegionRecord) -> Result<RegionRecord, StorageError> {
        let mut map = self
            .regions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.region_id) {
            return Err(StorageError::new("region exists"));
        }
        map.insert(record.region_id.clone(), record.clone());
        Ok(record)
    }

    async fn region_exists(
        &self,
        name: &str,
        level: RegionLevel,
        parent: Option<&str>,
    ) -> Result<bool, StorageError> {
        Ok(self
            .regions
            .read()
            .map(|map| {
                map.values().any(|record| {
                    record.name == name
                        && record.level == level
                        && record.parent.as_deref() == parent
                })
            })
            .unwrap_or(false))
    }

    async fn update_region(
        &self,
        region_id: &str,
        update: RegionUpdate,
    ) -> Result<Option<RegionRecord>, StorageError> {
        let mut map = self
            .regions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(region_id) {
            Some(record) => record,
            None => return Ok(None),
        };
        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(is_active) = update.is_active {
            record.is_active = is_active;
        }
        Ok(Some(record.clone()))
    }

    async fn delete_region(&self, region_id: &str) -> Result<bool, StorageError> {
        let mut map = self
            .regions
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.remove(region_id).is_some())
    }

    async fn count_children(&self, region_id: &str) -> Result<u64, StorageError> {
        Ok(self
            .regions
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| record.parent.as_deref() == Some(region_id))
                    .count() as u64
            })
            .unwrap_or_default())
    }
}
