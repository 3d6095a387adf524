use civic_storage::{CatalogKind, CatalogRecord, CatalogStore, CatalogUpdate, InMemoryCatalogStore};

fn item(id: &str, kind: CatalogKind, name: &str) -> CatalogRecord {
    CatalogRecord {
        item_id: id.to_string(),
        kind,
        name: name.to_string(),
        icon: String::new(),
        is_active: true,
    }
}

#[tokio::test]
async fn kinds_are_isolated() {
    let store = InMemoryCatalogStore::new();
    store
        .create_item(item("s-1", CatalogKind::Service, "Water"))
        .await
        .expect("create");
    store
        .create_item(item("c-1", CatalogKind::MskCategory, "Cleaning"))
        .await
        .expect("create");

    let services = store.list_active(CatalogKind::Service).await.expect("list");
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].item_id, "s-1");

    // 跨类别查找不命中。
    let missing = store
        .find_item(CatalogKind::Service, "c-1")
        .await
        .expect("find");
    assert!(missing.is_none());
}

#[tokio::test]
async fn deactivated_items_leave_active_listing() {
    let store = InMemoryCatalogStore::new();
    store
        .create_item(item("s-1", CatalogKind::Service, "Water"))
        .await
        .expect("create");
    store
        .update_item(
            CatalogKind::Service,
            "s-1",
            CatalogUpdate {
                is_active: Some(false),
                ..CatalogUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("found");

    let services = store.list_active(CatalogKind::Service).await.expect("list");
    assert!(services.is_empty());
}

#[tokio::test]
async fn duplicate_names_found_within_kind() {
    let store = InMemoryCatalogStore::new();
    store
        .create_item(item("t-1", CatalogKind::RequestType, "Roads"))
        .await
        .expect("create");

    let duplicate = store
        .find_by_name(CatalogKind::RequestType, "Roads")
        .await
        .expect("find");
    assert!(duplicate.is_some());

    let other_kind = store
        .find_by_name(CatalogKind::Service, "Roads")
        .await
        .expect("find");
    assert!(other_kind.is_none());
}
