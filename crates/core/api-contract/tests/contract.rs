use api_contract::{Paginated, StatusCounts};

#[test]
fn paginated_computes_page_count() {
    let page = Paginated::new(vec![1, 2, 3], 41, 1, 20);
    assert_eq!(page.total, 41);
    assert_eq!(page.pages, 3);
}

#[test]
fn paginated_handles_zero_limit() {
    let page = Paginated::<i32>::new(Vec::new(), 10, 1, 0);
    assert_eq!(page.pages, 0);
}

#[test]
fn status_counts_flatten_into_top_level_keys() {
    let counts = StatusCounts::from_counts([
        ("pending".to_string(), 3),
        ("in_review".to_string(), 2),
    ]);
    assert_eq!(counts.total, 5);

    let json = serde_json::to_value(&counts).expect("json");
    assert_eq!(json["total"], 5);
    assert_eq!(json["pending"], 3);
    assert_eq!(json["in_review"], 2);
}
