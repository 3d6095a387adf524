use civic_storage::{InMemoryRequestStore, RequestQuery, RequestRecord, RequestStore};
use domain::{Address, AllowList, RegionScope, RequestStatus};

fn request(id: &str, district: Option<&str>, type_id: Option<&str>, created_at_ms: i64) -> RequestRecord {
    RequestRecord {
        request_id: id.to_string(),
        user_id: "user-1".to_string(),
        category: "infrastructure".to_string(),
        type_id: type_id.map(str::to_string),
        description: "water outage".to_string(),
        contact_first_name: "A".to_string(),
        contact_last_name: "B".to_string(),
        contact_phone: "+1".to_string(),
        status: RequestStatus::Pending,
        rejection_reason: String::new(),
        closing_note: String::new(),
        cancel_reason: String::new(),
        assigned_admin: None,
        address: Address {
            region: Some("region-1".to_string()),
            district: district.map(str::to_string),
            ..Address::default()
        },
        created_at_ms,
    }
}

fn query(scope: RegionScope, allowed: AllowList) -> RequestQuery {
    RequestQuery {
        status: None,
        category: None,
        type_id: None,
        scope,
        allowed,
        page: 1,
        limit: 20,
    }
}

#[tokio::test]
async fn scope_filters_by_any_address_field() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(request("r-1", Some("district-7"), None, 1))
        .await
        .expect("create");
    store
        .create_request(request("r-2", Some("district-8"), None, 2))
        .await
        .expect("create");

    let (page, total) = store
        .list_requests(&query(
            RegionScope::AnyField("district-7".to_string()),
            AllowList::Unrestricted,
        ))
        .await
        .expect("list");
    assert_eq!(total, 1);
    assert_eq!(page[0].request_id, "r-1");
}

#[tokio::test]
async fn allow_list_excludes_unlisted_and_untyped() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(request("r-1", None, Some("type-1"), 1))
        .await
        .expect("create");
    store
        .create_request(request("r-2", None, Some("type-2"), 2))
        .await
        .expect("create");
    store
        .create_request(request("r-3", None, None, 3))
        .await
        .expect("create");

    let (page, total) = store
        .list_requests(&query(
            RegionScope::Unrestricted,
            AllowList::Only(vec!["type-1".to_string()]),
        ))
        .await
        .expect("list");
    assert_eq!(total, 1);
    assert_eq!(page[0].request_id, "r-1");
}

#[tokio::test]
async fn empty_allow_list_means_unrestricted() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(request("r-1", None, None, 1))
        .await
        .expect("create");

    let (_, total) = store
        .list_requests(&query(
            RegionScope::Unrestricted,
            AllowList::from_ids(Vec::new()),
        ))
        .await
        .expect("list");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn listing_paginates_newest_first() {
    let store = InMemoryRequestStore::new();
    for index in 0..5 {
        store
            .create_request(request(&format!("r-{index}"), None, None, index))
            .await
            .expect("create");
    }

    let mut page_query = query(RegionScope::Unrestricted, AllowList::Unrestricted);
    page_query.limit = 2;
    page_query.page = 2;
    let (page, total) = store.list_requests(&page_query).await.expect("list");
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].request_id, "r-2");
    assert_eq!(page[1].request_id, "r-1");
}

#[tokio::test]
async fn status_counts_respect_visibility() {
    let store = InMemoryRequestStore::new();
    store
        .create_request(request("r-1", Some("district-7"), Some("type-1"), 1))
        .await
        .expect("create");
    store
        .create_request(request("r-2", Some("district-7"), Some("type-2"), 2))
        .await
        .expect("create");
    store
        .create_request(request("r-3", Some("district-8"), Some("type-1"), 3))
        .await
        .expect("create");

    let counts = store
        .count_requests_by_status(
            &RegionScope::AnyField("district-7".to_string()),
            &AllowList::Only(vec!["type-1".to_string()]),
        )
        .await
        .expect("count");
    assert_eq!(counts, vec![("pending".to_string(), 1)]);
}
