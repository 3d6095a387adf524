use civic_workflow::{LifecycleError, MSK_ORDER, REQUEST, SERVICE_REPORT};
use domain::{MskOrderStatus, RequestStatus, ServiceReportStatus};

const REQUEST_STATES: [RequestStatus; 5] = [
    RequestStatus::Pending,
    RequestStatus::InReview,
    RequestStatus::Resolved,
    RequestStatus::Rejected,
    RequestStatus::Cancelled,
];

const REPORT_STATES: [ServiceReportStatus; 6] = [
    ServiceReportStatus::Unavailable,
    ServiceReportStatus::InProgress,
    ServiceReportStatus::PendingConfirmation,
    ServiceReportStatus::Confirmed,
    ServiceReportStatus::Rejected,
    ServiceReportStatus::Cancelled,
];

const ORDER_STATES: [MskOrderStatus; 6] = [
    MskOrderStatus::Pending,
    MskOrderStatus::InReview,
    MskOrderStatus::PendingConfirmation,
    MskOrderStatus::Confirmed,
    MskOrderStatus::Rejected,
    MskOrderStatus::Cancelled,
];

#[test]
fn pairs_outside_table_are_invalid() {
    for from in REPORT_STATES {
        for to in REPORT_STATES {
            let expected = SERVICE_REPORT.admin_targets(from).contains(&to);
            let outcome = SERVICE_REPORT.admin_transition(from, to, Some("reason"));
            assert_eq!(outcome.is_ok(), expected, "report {from} -> {to}");
        }
    }
    for from in ORDER_STATES {
        for to in ORDER_STATES {
            let expected = MSK_ORDER.admin_targets(from).contains(&to);
            let outcome = MSK_ORDER.admin_transition(from, to, Some("reason"));
            assert_eq!(outcome.is_ok(), expected, "order {from} -> {to}");
        }
    }
}

#[test]
fn invalid_transition_carries_both_states() {
    let err = SERVICE_REPORT
        .admin_transition(
            ServiceReportStatus::Unavailable,
            ServiceReportStatus::Confirmed,
            None,
        )
        .expect_err("direct confirm");
    assert_eq!(
        err,
        LifecycleError::InvalidTransition {
            from: "unavailable".to_string(),
            to: "confirmed".to_string(),
        }
    );
}

#[test]
fn request_admin_moves_freely_between_states() {
    for from in REQUEST_STATES {
        for to in REQUEST_STATES {
            let reason = (to == RequestStatus::Rejected).then_some("reason");
            REQUEST
                .admin_transition(from, to, reason)
                .unwrap_or_else(|err| panic!("request {from} -> {to}: {err}"));
        }
    }
}

#[test]
fn rejection_requires_reason_for_every_kind() {
    for reason in [None, Some(""), Some("   ")] {
        let err = REQUEST
            .admin_transition(RequestStatus::Pending, RequestStatus::Rejected, reason)
            .expect_err("request reject");
        assert_eq!(err, LifecycleError::MissingReason);

        let err = SERVICE_REPORT
            .admin_transition(
                ServiceReportStatus::InProgress,
                ServiceReportStatus::Rejected,
                reason,
            )
            .expect_err("report reject");
        assert_eq!(err, LifecycleError::MissingReason);

        let err = MSK_ORDER
            .admin_transition(MskOrderStatus::InReview, MskOrderStatus::Rejected, reason)
            .expect_err("order reject");
        assert_eq!(err, LifecycleError::MissingReason);
    }
}

#[test]
fn entering_review_assigns_admin() {
    let transition = REQUEST
        .admin_transition(RequestStatus::Pending, RequestStatus::InReview, None)
        .expect("to in_review");
    assert!(transition.assign_admin);

    // 继续推进到 resolved：无需理由，也不再重复记录。
    let transition = REQUEST
        .admin_transition(RequestStatus::InReview, RequestStatus::Resolved, None)
        .expect("to resolved");
    assert!(!transition.assign_admin);

    let transition = MSK_ORDER
        .admin_transition(MskOrderStatus::Pending, MskOrderStatus::InReview, None)
        .expect("order review");
    assert!(transition.assign_admin);
}

#[test]
fn report_records_admin_on_every_transition() {
    let transition = SERVICE_REPORT
        .admin_transition(
            ServiceReportStatus::Unavailable,
            ServiceReportStatus::InProgress,
            None,
        )
        .expect("to in_progress");
    assert!(transition.assign_admin);

    let transition = SERVICE_REPORT
        .admin_transition(
            ServiceReportStatus::InProgress,
            ServiceReportStatus::PendingConfirmation,
            None,
        )
        .expect("to pending_confirmation");
    assert!(transition.assign_admin);
}

#[test]
fn report_confirmation_paths() {
    let accepted = SERVICE_REPORT
        .user_confirm(ServiceReportStatus::PendingConfirmation, true)
        .expect("accept");
    assert_eq!(accepted, ServiceReportStatus::Confirmed);

    let declined = SERVICE_REPORT
        .user_confirm(ServiceReportStatus::PendingConfirmation, false)
        .expect("decline");
    assert_eq!(declined, ServiceReportStatus::Unavailable);

    SERVICE_REPORT
        .user_confirm(ServiceReportStatus::Unavailable, true)
        .expect_err("not awaiting confirmation");
}

#[test]
fn order_confirmation_declines_back_to_review() {
    let accepted = MSK_ORDER
        .user_confirm(MskOrderStatus::PendingConfirmation, true)
        .expect("accept");
    assert_eq!(accepted, MskOrderStatus::Confirmed);

    let declined = MSK_ORDER
        .user_confirm(MskOrderStatus::PendingConfirmation, false)
        .expect("decline");
    assert_eq!(declined, MskOrderStatus::InReview);
}

#[test]
fn request_has_no_confirmation_flow() {
    REQUEST
        .user_confirm(RequestStatus::Pending, true)
        .expect_err("unsupported");
}

#[test]
fn cancel_allowed_outside_non_cancellable_set() {
    for from in REQUEST_STATES {
        let expected = !matches!(
            from,
            RequestStatus::Resolved | RequestStatus::Rejected | RequestStatus::Cancelled
        );
        assert_eq!(REQUEST.user_cancel(from).is_ok(), expected, "request {from}");
    }
    for from in REPORT_STATES {
        let expected = !matches!(
            from,
            ServiceReportStatus::Confirmed
                | ServiceReportStatus::Rejected
                | ServiceReportStatus::Cancelled
        );
        assert_eq!(
            SERVICE_REPORT.user_cancel(from).is_ok(),
            expected,
            "report {from}"
        );
    }
    for from in ORDER_STATES {
        let expected = !matches!(
            from,
            MskOrderStatus::PendingConfirmation
                | MskOrderStatus::Confirmed
                | MskOrderStatus::Rejected
                | MskOrderStatus::Cancelled
        );
        assert_eq!(MSK_ORDER.user_cancel(from).is_ok(), expected, "order {from}");
    }
}

#[test]
fn content_edit_only_in_initial_status() {
    REQUEST.ensure_editable(RequestStatus::Pending).expect("editable");
    let err = REQUEST
        .ensure_editable(RequestStatus::InReview)
        .expect_err("frozen");
    assert_eq!(err, LifecycleError::NotEditable);

    MSK_ORDER.ensure_editable(MskOrderStatus::Pending).expect("editable");
    MSK_ORDER
        .ensure_editable(MskOrderStatus::Confirmed)
        .expect_err("frozen");
}
