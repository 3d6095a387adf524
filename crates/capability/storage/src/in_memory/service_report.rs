//! 服务报修内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{ReportQuery, ReportStatusChange, ServiceReportRecord, ServiceStatusCount};
use crate::traits::ServiceReportStore;
use domain::{AllowList, RegionScope, ServiceReportStatus};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// 服务报修内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryServiceReportStore {
    reports: RwLock<HashMap<String, ServiceReportRecord>>,
}

impl InMemoryServiceReportStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryServiceReportStore {
    fn default() -> Self {
        Self::new()
    }
}

fn query_matches(record: &ServiceReportRecord, query: &ReportQuery) -> bool {
    if let Some(status) = query.status {
        if record.status != status {
            return false;
        }
    }
    if let Some(service_id) = &query.service_id {
        if &record.service_id != service_id {
            return false;
        }
    }
    query.scope.matches(&record.address) && query.allowed.permits(&record.service_id)
}

#[async_trait::async_trait]
impl ServiceReportStore for InMemoryServiceReportStore {
    async fn create_report(
        &self,
        record: ServiceReportRecord,
    ) -> Result<ServiceReportRecord, StorageError> {
        let mut map = self
            .reports
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.report_id) {
            return Err(StorageError::new("report exists"));
        }
        map.insert(record.report_id.clone(), record.clone());
        Ok(record)
    }

    async fn find_report(
        &self,
        report_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        Ok(self
            .reports
            .read()
            .ok()
            .and_then(|map| map.get(report_id).cloned()))
    }

    async fn find_owned_report(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        Ok(self.reports.read().ok().and_then(|map| {
            map.get(report_id)
                .filter(|record| record.user_id == user_id)
                .cloned()
        }))
    }

    async fn list_owned_reports(
        &self,
        user_id: &str,
    ) -> Result<Vec<ServiceReportRecord>, StorageError> {
        let mut reports: Vec<ServiceReportRecord> = self
            .reports
            .read()
            .map(|map| {
                map.values()
                    .filter(|record| record.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        reports.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        Ok(reports)
    }

    async fn list_reports(
        &self,
        query: &ReportQuery,
    ) -> Result<(Vec<ServiceReportRecord>, u64), StorageError> {
        let mut matched: Vec<ServiceReportRecord> = self
            .reports
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

    async fn apply_report_change(
        &self,
        report_id: &str,
        expected: ServiceReportStatus,
        change: ReportStatusChange,
    ) -> Result<Option<ServiceReportRecord>, StorageError> {
        let mut map = self
            .reports
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = match map.get_mut(report_id) {
            Some(record) => record,
            None => return Ok(None),
        };
        if record.status != expected {
            return Err(StorageError::Conflict);
        }
        record.status = change.status;
        if let Some(admin) = change.resolved_by_admin {
            record.resolved_by_admin = Some(admin);
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
        if let Some(note) = change.admin_note {
            record.admin_note = note;
        }
        Ok(Some(record.clone()))
    }

    async fn count_reports_by_status(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
    ) -> Result<Vec<(String, u64)>, StorageError> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        if let Ok(map) = self.reports.read() {
            for record in map.values() {
                if scope.matches(&record.address) && allowed.permits(&record.service_id) {
                    *counts.entry(record.status.as_str().to_string()).or_insert(0) += 1;
                }
            }
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_reports_by_service(
        &self,
        scope: &RegionScope,
        allowed: &AllowList,
        service_id: Option<&str>,
    ) -> Result<Vec<ServiceStatusCount>, StorageError> {
        let mut counts: BTreeMap<(String, ServiceReportStatus), u64> = BTreeMap::new();
        if let Ok(map) = self.reports.read() {
            for record in map.values() {
                if let Some(service_id) = service_id {
                    if record.service_id != service_id {
                        continue;
                    }
                }
                if scope.matches(&record.address) && allowed.permits(&record.service_id) {
                    *counts
                        .entry((record.service_id.clone(), record.status))
                        .or_insert(0) += 1;
                }
            }
        }
        Ok(counts
            .into_iter()
            .map(|((service_id, status), count)| ServiceStatusCount {
                service_id,
                status,
                count,
            })
            .collect())
    }
}
