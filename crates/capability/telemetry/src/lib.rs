//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 工单流量计数快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub tickets_created: u64,
    pub transitions_applied: u64,
    pub transitions_rejected: u64,
    pub confirmations: u64,
    pub cancellations: u64,
}

/// 工单流量计数。
pub struct TelemetryMetrics {
    tickets_created: AtomicU64,
    transitions_applied: AtomicU64,
    transitions_rejected: AtomicU64,
    confirmations: AtomicU64,
    cancellations: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            tickets_created: AtomicU64::new(0),
            transitions_applied: AtomicU64::new(0),
            transitions_rejected: AtomicU64::new(0),
            confirmations: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tickets_created: self.tickets_created.load(Ordering::Relaxed),
            transitions_applied: self.transitions_applied.load(Ordering::Relaxed),
            transitions_rejected: self.transitions_rejected.load(Ordering::Relaxed),
            confirmations: self.confirmations.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录工单创建次数。
pub fn record_ticket_created() {
    metrics().tickets_created.fetch_add(1, Ordering::Relaxed);
}

/// 记录通过校验并落库的状态迁移次数。
pub fn record_transition_applied() {
    metrics().transitions_applied.fetch_add(1, Ordering::Relaxed);
}

/// 记录被状态机拒绝的迁移次数。
pub fn record_transition_rejected() {
    metrics().transitions_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录用户确认子迁移次数。
pub fn record_confirmation() {
    metrics().confirmations.fetch_add(1, Ordering::Relaxed);
}

/// 记录用户取消次数。
pub fn record_cancellation() {
    metrics().cancellations.fetch_add(1, Ordering::Relaxed);
}
