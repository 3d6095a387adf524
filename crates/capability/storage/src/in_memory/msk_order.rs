//! 社区服务订单内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{MskOrderRecord, OrderContentUpdate, OrderQuery, OrderStatusChange};
use crate::traits::MskOrderStore;
use domain::{AllowList, MskOrderStatus, RegionScope};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// 社区服务订单内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryMskOrderStore {
    orders: RwLock<HashMap<String, MskOrderRecord>>,
}

impl InMemoryMskOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMskOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

fn query_matches(record: &MskOrderRecord, query: &OrderQuery) -> bool {
    if let Some(status) = query.status {
        if record.status != status {
            return false;
        }
    }
    if let Some(category_id) = &query.category_id {
        if &record.category_id != category_id {
            return false;
        }
    }
    query.scope.matches(&record.address) && query.allowed.permits(&record.category_id)
}

#[async_trait::async_trait]
impl MskOrderStore for InMemoryMskOrderStore {
    async fn create_order(&self, record: MskOrderRecord) -> Result<MskOrderRecord, StorageError> {
        let mut map = self
            .orders
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.order_id) {
            return Err(StorageError::new("order exists"));
        }
        map.insert(record.order_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<MskOrderRecord>, StorageError> {
        Ok(self
            .orders
            .read()
            .ok()
            .and_then(|map| map.get(order_id).cloned()))
    }

    async fn find_owned_order(
        &self,
        order_id: &str,
        user_id: &str,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        Ok(self.orders.read().ok().and_then(|map| {
            map.get(order_id)
                .filter(|record| record.user_id == user_id)
                .cloned()
        }))
    }

    async fn list_owned_orders(
        &self,
        user_id: &str,
    ) -> Result<Vec<MskOrderRecord>, StorageError> {
        let mut orders: Vec<MskOrderRecord> = self
            .orders
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| record.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        orders.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(orders)
    }

    async fn list_orders(
        &self,
        query: &OrderQuery,
    ) -> Result<(Vec<MskOrderRecord>, u64), StorageError> {
        let mut matched: Vec<MskOrderRecord> = self
            .orders
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| query_matches(record, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        let total = matched.len() as u64;
        let offset = query.page.saturating_sub(1) as usize * query.limit as usize;
        let page = matched
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_order_content(
        &self,
        order_id: &str,
        user_id: &str,
        update: OrderContentUpdate,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        let mut map = self
            .orders
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(order_id) {
            Some(record) if record.user_id == user_id => record,
            _ => return Ok(None),
        };
        if let Some(description) = update.description {
            record.description = description;
        }
        if let Some(first_name) = update.contact_first_name {
            record.contact_first_name = first_name;
        }
        if let Some(last_name) = update.contact_last_name {
            record.contact_last_name = last_name;
        }
        if let Some(phone) = update.contact_phone {
            record.contact_phone = phone;
        }
        Ok(Some(record.clone()))
    }

    async fn apply_order_change(
        &self,
        order_id: &str,
        expected: MskOrderStatus,
        change: OrderStatusChange,
    ) -> Result<Option<MskOrderRecord>, StorageError> {
        let mut map = self
            .orders
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(order_id) {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.status != expected {
            return Err(StorageError::Conflict);
        }
        record.status = change.status;
        if let Some(admin) = change.assigned_admin {
            record.assigned_admin = Some(admin);
        }
        if let Some(confirmed) = change.confirmed_by_user {
            record.confirmed_by_user = Some(confirmed);
        }
        if let Some(reason) = change.rejection_reason {
            record.rejection_reason = reason;
        }
        if let Some(reason) = change.cancel_reason {
            record.cancel_reason = reason;
        }
        Ok(Some(record.clone()))
    }

    async fn count_orders_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        if let Ok(map) = self.orders.read() {
            for record in map.values() {
                if scope.matches(&record.address) && allowed.permits(&record.category_id) {
                    *counts.entry(record.status.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }
        Ok(counts.into_iter().collect())
    }
}
