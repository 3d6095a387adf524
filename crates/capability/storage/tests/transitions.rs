use civic_storage::{
    InMemoryRequestStore, RequestRecord, RequestStatusChange, RequestStore, StorageError,
};
use domain::{Address, RequestStatus};

fn pending_request(id: &str) -> RequestRecord {
    RequestRecord {
        request_id: id.to_string(),
        user_id: "user-1".to_string(),
        category: "social".to_string(),
        type_id: None,
        description: "noise complaint".to_string(),
        contact_first_name: "A".to_string(),
        contact_last_name: "B".to_string(),
        contact_phone: "+1".to_string(),
        status: RequestStatus::Pending,
        rejection_reason: String::new(),
        closing_note: String::new(),
        cancel_reason: String::new(),
        assigned_admin: None,
        address: Address::default(),
        created_at_ms: 1,
    }
}

#[tokio::test]
async fn conditional_change_applies_side_effects() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(pending_request("r-1"))
        .await
        .expect("create");

    let updated = store
        .apply_request_change(
            "r-1",
            RequestStatus::Pending,
            RequestStatusChange {
                assigned_admin: Some("admin-1".to_string()),
                ..RequestStatusChange::to(RequestStatus::InReview)
            },
        )
        .await
        .expect("apply")
        .expect("found");
    assert_eq!(updated.status, RequestStatus::InReview);
    assert_eq!(updated.assigned_admin.as_deref(), Some("admin-1"));
}

#[tokio::test]
async fn stale_expected_status_is_a_conflict() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(pending_request("r-1"))
        .await
        .expect("create");
    store
        .apply_request_change(
            "r-1",
            RequestStatus::Pending,
            RequestStatusChange::to(RequestStatus::InReview),
        )
        .await
        .expect("apply")
        .expect("found");

    // 第二个并发迁移仍然以 pending 为前提：必须显式失败而非覆盖。
    let err = store
        .apply_request_change(
            "r-1",
            RequestStatus::Pending,
            RequestStatusChange::to(RequestStatus::Resolved),
        )
        .await
        .expect_err("conflict");
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn missing_ticket_is_not_a_conflict() {
    let store = InMemoryRequestStore::new();
    let outcome = store
        .apply_request_change(
            "ghost",
            RequestStatus::Pending,
            RequestStatusChange::to(RequestStatus::InReview),
        )
        .await
        .expect("apply");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn clearing_type_id_with_nested_none() {
    let store = InMemoryRequestStore::new();
    let mut record = pending_request("r-1");
    record.type_id = Some("type-1".to_string());
    store.create_request(record).await.expect("create");

    let updated = store
        .apply_request_change(
            "r-1",
            RequestStatus::Pending,
            RequestStatusChange {
                type_id: Some(None),
                ..RequestStatusChange::to(RequestStatus::Pending)
            },
        )
        .await
        .expect("apply")
        .expect("found");
    assert!(updated.type_id.is_none());
}
