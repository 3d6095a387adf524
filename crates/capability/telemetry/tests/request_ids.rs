use civic_telemetry::{new_request_ids, record_ticket_created};

#[test]
fn request_ids_non_empty() {
    let ids = new_request_ids();
    assert!(!ids.request_id.is_empty());
    assert!(!ids.trace_id.is_empty());
    assert_ne!(ids.request_id, ids.trace_id);
}

#[test]
fn counters_accumulate() {
    let before = civic_telemetry::metrics().snapshot().tickets_created;
    record_ticket_created();
    let after = civic_telemetry::metrics().snapshot().tickets_created;
    assert_eq!(after, before + 1);
}
