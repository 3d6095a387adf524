//! 诉求工单内存存储实现
//!
//! 仅用于本地演示和测试。列表过滤与 Postgres 实现保持同一语义：
//! 普通条件 ∧ 区域谓词 ∧ 白名单，创建时间倒序，偏移分页。

use crate::error::StorageError;
use crate::models::{RequestContentUpdate, RequestQuery, RequestRecord, RequestStatusChange};
use crate::traits::RequestStore;
use domain::{AllowList, RegionScope, RequestStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// 诉求工单内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryRequestStore {
    requests: RwLock<HashMap<String, RequestRecord>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 白名单对可空子类型的判定：受限白名单不放行未分类工单。
fn allow_permits(allowed: &AllowList, type_id: Option<&str>) -> bool {
    match allowed {
        AllowList::Unrestricted => true,
        AllowList::Only(_) => type_id.map(|id| allowed.permits(id)).unwrap_or(false),
    }
}

fn query_matches(record: &RequestRecord, query: &RequestQuery) -> bool {
    if let Some(status) = query.status {
        if record.status != status {
            return false;
        }
    }
    if let Some(category) = &query.category {
        if &record.category != category {
            return false;
        }
    }
    if let Some(type_id) = &query.type_id {
        if record.type_id.as_deref() != Some(type_id.as_str()) {
            return false;
        }
    }
    query.scope.matches(&record.address) && allow_permits(&query.allowed, record.type_id.as_deref())
}

#[async_trait::async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create_request(&self, record: RequestRecord) -> Result<RequestRecord, StorageError> {
        let mut map = self
            .requests
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.request_id) {
            return Err(StorageError::new("request exists"));
        }
        map.insert(record.request_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_request(&self, request_id: &str) -> Result<Option<RequestRecord>, StorageError> {
        Ok(self
            .requests
            .read()
            .ok()
            .and_then(|map| map.get(request_id).cloned()))
    }

    async fn find_owned_request(
        &self,
        request_id: &str,
        user_id: &str,
    ) -> Result<Option<RequestRecord>, StorageError> {
        Ok(self.requests.read().ok().and_then(|map| {
            map.get(request_id)
                .filter(|record| record.user_id == user_id)
                .cloned()
        }))
    }

    async fn list_owned_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<RequestRecord>, StorageError> {
        let mut requests: Vec<RequestRecord> = self
            .requests
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| record.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        requests.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(requests)
    }

    async fn list_requests(
        &self,
        query: &RequestQuery,
    ) -> Result<(Vec<RequestRecord>, u64), StorageError> {
        let mut matched: Vec<RequestRecord> = self
            .requests
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

    async fn update_request_content(
        &self,
        request_id: &str,
        user_id: &str,
        update: RequestContentUpdate,
    ) -> Result<Option<RequestRecord>, StorageError> {
        let mut map = self
            .requests
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(request_id) {
            Some(record) if record.user_id == user_id => record,
            _ => return Ok(None),
        };
        if let Some(category) = update.category {
            record.category = category;
        }
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

    async fn apply_request_change(
        &self,
        request_id: &str,
        expected: RequestStatus,
        change: RequestStatusChange,
    ) -> Result<Option<RequestRecord>, StorageError> {
        let mut map = self
            .requests
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(request_id) {
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
        if let Some(reason) = change.rejection_reason {
            record.rejection_reason = reason;
        }
        if let Some(note) = change.closing_note {
            record.closing_note = note;
        }
        if let Some(reason) = change.cancel_reason {
            record.cancel_reason = reason;
        }
        if let Some(type_id) = change.type_id {
            record.type_id = type_id;
        }
        Ok(Some(record.clone()))
    }

    async fn count_requests_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        if let Ok(map) = self.requests.read() {
            for record in map.values() {
                if scope.matches(&record.address)
                    && allow_permits(allowed, record.type_id.as_deref())
                {
                    *counts.entry(record.status.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }
        Ok(counts.into_iter().collect())
    }
}
