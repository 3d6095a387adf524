use domain::RegionLevel;

#[test]
fn levels_chain_region_to_street() {
    assert_eq!(RegionLevel::Region.child(), Some(RegionLevel::District));
    assert_eq!(RegionLevel::District.child(), Some(RegionLevel::Neighborhood));
    assert_eq!(RegionLevel::Neighborhood.child(), Some(RegionLevel::Street));
    assert_eq!(RegionLevel::Street.child(), None);
}

#[test]
fn parent_is_inverse_of_child() {
    for level in [
        RegionLevel::Region,
        RegionLevel::District,
        RegionLevel::Neighborhood,
        RegionLevel::Street,
    ] {
        if let Some(child) = level.child() {
            assert_eq!(child.parent(), Some(level));
        }
    }
    assert_eq!(RegionLevel::Region.parent(), None);
}

#[test]
fn level_round_trips_text() {
    for level in [
        RegionLevel::Region,
        RegionLevel::District,
        RegionLevel::Neighborhood,
        RegionLevel::Street,
    ] {
        assert_eq!(RegionLevel::parse(level.as_str()), Some(level));
    }
    assert_eq!(RegionLevel::parse("city"), None);
}
