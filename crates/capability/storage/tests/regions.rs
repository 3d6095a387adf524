use civic_storage::{InMemoryRegionStore, ParentFilter, RegionFilter, RegionRecord, RegionStore};
use domain::RegionLevel;

fn node(id: &str, name: &str, level: RegionLevel, parent: Option<&str>) -> RegionRecord {
    RegionRecord {
        region_id: id.to_string(),
        name: name.to_string(),
        level,
        parent: parent.map(str::to_string),
        is_active: true,
    }
}

async fn seeded() -> InMemoryRegionStore {
    let store = InMemoryRegionStore::new();
    store
        .create_region(node("r-1", "North Region", RegionLevel::Region, None))
        .await
        .expect("create");
    store
        .create_region(node("d-1", "Central District", RegionLevel::District, Some("r-1")))
        .await
        .expect("create");
    store
        .create_region(node("d-2", "Airport District", RegionLevel::District, Some("r-1")))
        .await
        .expect("create");
    store
}

#[tokio::test]
async fn roots_listed_without_parent() {
    let store = seeded().await;
    let roots = store
        .list_regions(RegionFilter {
            level: Some(RegionLevel::Region),
            parent: Some(ParentFilter::Root),
        })
        .await
        .expect("list");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].region_id, "r-1");
}

#[tokio::test]
async fn children_drill_down_sorted_by_name() {
    let store = seeded().await;
    let children = store
        .list_regions(RegionFilter {
            level: None,
            parent: Some(ParentFilter::Node("r-1".to_string())),
        })
        .await
        .expect("list");
    let names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, vec!["Airport District", "Central District"]);
}

#[tokio::test]
async fn empty_drill_down_is_not_an_error() {
    let store = seeded().await;
    let children = store
        .list_regions(RegionFilter {
            level: None,
            parent: Some(ParentFilter::Node("d-1".to_string())),
        })
        .await
        .expect("list");
    assert!(children.is_empty());
}

#[tokio::test]
async fn duplicate_detection_scoped_to_parent() {
    let store = seeded().await;
    let duplicated = store
        .region_exists("Central District", RegionLevel::District, Some("r-1"))
        .await
        .expect("exists");
    assert!(duplicated);

    let elsewhere = store
        .region_exists("Central District", RegionLevel::District, Some("r-2"))
        .await
        .expect("exists");
    assert!(!elsewhere);
}

#[tokio::test]
async fn children_counted_before_delete() {
    let store = seeded().await;
    assert_eq!(store.count_children("r-1").await.expect("count"), 2);
    assert_eq!(store.count_children("d-1").await.expect("count"), 0);
    assert!(store.delete_region("d-1").await.expect("delete"));
    assert_eq!(store.count_children("r-1").await.expect("count"), 1);
}
