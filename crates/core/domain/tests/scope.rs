use domain::{
    Address, AdminProfile, AssignedRegion, Principal, RegionLevel, RegionScope, Role, scope_filter,
};

fn admin_assigned(region: &str, level: RegionLevel) -> Principal {
    Principal {
        id: "admin-1".to_string(),
        role: Role::Admin(AdminProfile {
            assigned_region: Some(AssignedRegion {
                region: region.to_string(),
                level,
            }),
            grants: Default::default(),
        }),
    }
}

#[test]
fn owner_without_explicit_region_is_unrestricted() {
    let owner = Principal {
        id: "owner-1".to_string(),
        role: Role::Owner,
    };
    assert!(scope_filter(&owner, None).is_unrestricted());
}

#[test]
fn admin_without_assignment_is_unrestricted() {
    let admin = Principal {
        id: "admin-1".to_string(),
        role: Role::Admin(AdminProfile::default()),
    };
    assert!(scope_filter(&admin, None).is_unrestricted());
}

#[test]
fn admin_scope_matches_any_address_field() {
    let admin = admin_assigned("r-77", RegionLevel::District);
    let scope = scope_filter(&admin, None);

    // 指派区域落在 district 字段且 region 字段是别的节点：仍然命中。
    let address = Address {
        region: Some("r-1".to_string()),
        district: Some("r-77".to_string()),
        ..Address::default()
    };
    assert!(scope.matches(&address));
}

#[test]
fn admin_scope_does_not_walk_hierarchy() {
    let admin = admin_assigned("r-77", RegionLevel::District);
    let scope = scope_filter(&admin, None);

    // 工单只填了更细层级的另一节点：精确相等不命中，即使该街道
    // 在树上从属于 r-77。
    let address = Address {
        street: Some("street-under-r-77".to_string()),
        ..Address::default()
    };
    assert!(!scope.matches(&address));
}

#[test]
fn explicit_region_replaces_admin_scope() {
    let admin = admin_assigned("r-77", RegionLevel::District);
    let scope = scope_filter(&admin, Some("r-5"));
    assert_eq!(scope, RegionScope::AnyField("r-5".to_string()));

    let own_region = Address {
        district: Some("r-77".to_string()),
        ..Address::default()
    };
    assert!(!scope.matches(&own_region));
}

#[test]
fn at_level_matches_single_field_only() {
    let scope = RegionScope::AtLevel(RegionLevel::District, "r-77".to_string());
    let in_district = Address {
        district: Some("r-77".to_string()),
        ..Address::default()
    };
    let in_region_field = Address {
        region: Some("r-77".to_string()),
        ..Address::default()
    };
    assert!(scope.matches(&in_district));
    assert!(!scope.matches(&in_region_field));
}
