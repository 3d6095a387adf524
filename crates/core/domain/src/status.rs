//! 工单状态集合
//!
//! 三种工单各自的有限状态集。状态迁移规则在 civic-workflow 中以
//! 声明式迁移表定义，这里只提供状态本身及其文本表示。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 诉求工单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InReview,
    Resolved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InReview => "in_review",
            RequestStatus::Resolved => "resolved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RequestStatus::Pending),
            "in_review" => Some(RequestStatus::InReview),
            "resolved" => Some(RequestStatus::Resolved),
            "rejected" => Some(RequestStatus::Rejected),
            "cancelled" => Some(RequestStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 服务报修工单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceReportStatus {
    Unavailable,
    InProgress,
    PendingConfirmation,
    Confirmed,
    Rejected,
    Cancelled,
}

impl ServiceReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceReportStatus::Unavailable => "unavailable",
            ServiceReportStatus::InProgress => "in_progress",
            ServiceReportStatus::PendingConfirmation => "pending_confirmation",
            ServiceReportStatus::Confirmed => "confirmed",
            ServiceReportStatus::Rejected => "rejected",
            ServiceReportStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unavailable" => Some(ServiceReportStatus::Unavailable),
            "in_progress" => Some(ServiceReportStatus::InProgress),
            "pending_confirmation" => Some(ServiceReportStatus::PendingConfirmation),
            "confirmed" => Some(ServiceReportStatus::Confirmed),
            "rejected" => Some(ServiceReportStatus::Rejected),
            "cancelled" => Some(ServiceReportStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 社区服务订单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MskOrderStatus {
    Pending,
    InReview,
    PendingConfirmation,
    Confirmed,
    Rejected,
    Cancelled,
}

impl MskOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MskOrderStatus::Pending => "pending",
            MskOrderStatus::InReview => "in_review",
            MskOrderStatus::PendingConfirmation => "pending_confirmation",
            MskOrderStatus::Confirmed => "confirmed",
            MskOrderStatus::Rejected => "rejected",
            MskOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MskOrderStatus::Pending),
            "in_review" => Some(MskOrderStatus::InReview),
            "pending_confirmation" => Some(MskOrderStatus::PendingConfirmation),
            "confirmed" => Some(MskOrderStatus::Confirmed),
            "rejected" => Some(MskOrderStatus::Rejected),
            "cancelled" => Some(MskOrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for MskOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
