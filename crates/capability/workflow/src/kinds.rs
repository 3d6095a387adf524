//! 三种工单类型的生命周期定义
//!
//! 迁移表为声明式数据，引擎逻辑全部在 crate 根；新增工单类型时
//! 只需补一份定义。

use crate::{AssignRule, Confirmation, Lifecycle};
use domain::{MskOrderStatus, RequestStatus, ServiceReportStatus};

const REQUEST_ALL: &[RequestStatus] = &[
    RequestStatus::Pending,
    RequestStatus::InReview,
    RequestStatus::Resolved,
    RequestStatus::Rejected,
    RequestStatus::Cancelled,
];

/// 诉求工单：管理侧在五个状态间自由流转，仅受拒绝理由约束；
/// 进入 in_review 时记录受理管理员。
pub const REQUEST: Lifecycle<RequestStatus> = Lifecycle {
    initial: RequestStatus::Pending,
    admin_transitions: &[
        (RequestStatus::Pending, REQUEST_ALL),
        (RequestStatus::InReview, REQUEST_ALL),
        (RequestStatus::Resolved, REQUEST_ALL),
        (RequestStatus::Rejected, REQUEST_ALL),
        (RequestStatus::Cancelled, REQUEST_ALL),
    ],
    rejected: RequestStatus::Rejected,
    cancelled: RequestStatus::Cancelled,
    non_cancellable: &[
        RequestStatus::Resolved,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ],
    assign_rule: AssignRule::OnEnter(RequestStatus::InReview),
    confirmation: None,
};

/// 服务报修：管理侧只能推进到待确认或拒绝，confirmed 由用户确认
/// 子迁移产生；任何管理侧迁移都记录处理管理员。
pub const SERVICE_REPORT: Lifecycle<ServiceReportStatus> = Lifecycle {
    initial: ServiceReportStatus::Unavailable,
    admin_transitions: &[
        (
            ServiceReportStatus::Unavailable,
            &[
                ServiceReportStatus::InProgress,
                ServiceReportStatus::PendingConfirmation,
                ServiceReportStatus::Rejected,
            ],
        ),
        (
            ServiceReportStatus::InProgress,
            &[
                ServiceReportStatus::PendingConfirmation,
                ServiceReportStatus::Rejected,
            ],
        ),
    ],
    rejected: ServiceReportStatus::Rejected,
    cancelled: ServiceReportStatus::Cancelled,
    non_cancellable: &[
        ServiceReportStatus::Confirmed,
        ServiceReportStatus::Rejected,
        ServiceReportStatus::Cancelled,
    ],
    assign_rule: AssignRule::OnAnyTransition,
    confirmation: Some(Confirmation {
        from: ServiceReportStatus::PendingConfirmation,
        accepted: ServiceReportStatus::Confirmed,
        declined: ServiceReportStatus::Unavailable,
    }),
};

/// 社区服务订单：管理侧在 pending / in_review / pending_confirmation
/// 之间往返或拒绝；用户确认接受后到 confirmed，不接受退回 in_review。
pub const MSK_ORDER: Lifecycle<MskOrderStatus> = Lifecycle {
    initial: MskOrderStatus::Pending,
    admin_transitions: &[
        (
            MskOrderStatus::Pending,
            &[
                MskOrderStatus::InReview,
                MskOrderStatus::PendingConfirmation,
                MskOrderStatus::Rejected,
            ],
        ),
        (
            MskOrderStatus::InReview,
            &[
                MskOrderStatus::Pending,
                MskOrderStatus::PendingConfirmation,
                MskOrderStatus::Rejected,
            ],
        ),
        (
            MskOrderStatus::PendingConfirmation,
            &[
                MskOrderStatus::Pending,
                MskOrderStatus::InReview,
                MskOrderStatus::Rejected,
            ],
        ),
    ],
    rejected: MskOrderStatus::Rejected,
    cancelled: MskOrderStatus::Cancelled,
    non_cancellable: &[
        MskOrderStatus::PendingConfirmation,
        MskOrderStatus::Confirmed,
        MskOrderStatus::Rejected,
        MskOrderStatus::Cancelled,
    ],
    assign_rule: AssignRule::OnEnter(MskOrderStatus::InReview),
    confirmation: Some(Confirmation {
        from: MskOrderStatus::PendingConfirmation,
        accepted: MskOrderStatus::Confirmed,
        declined: MskOrderStatus::InReview,
    }),
};
