use domain::{
    AccessLevel, AdminGrants, AdminProfile, AllowList, Module, ModuleGrant, PermissionError,
    Principal, RequiredAccess, Role, effective_access, evaluate,
};

fn owner() -> Principal {
    Principal {
        id: "owner-1".to_string(),
        role: Role::Owner,
    }
}

fn citizen() -> Principal {
    Principal {
        id: "user-1".to_string(),
        role: Role::User,
    }
}

fn admin_with(requests: Option<ModuleGrant>) -> Principal {
    Principal {
        id: "admin-1".to_string(),
        role: Role::Admin(AdminProfile {
            assigned_region: None,
            grants: AdminGrants {
                requests,
                ..AdminGrants::default()
            },
        }),
    }
}

#[test]
fn owner_allowed_everywhere() {
    for module in [Module::Requests, Module::Services, Module::Msk] {
        for required in [RequiredAccess::Read, RequiredAccess::Manage] {
            let allow = evaluate(&owner(), module, required).expect("owner allow");
            assert!(allow.is_unrestricted());
        }
    }
}

#[test]
fn user_role_always_denied() {
    let err = evaluate(&citizen(), Module::Requests, RequiredAccess::Read).expect_err("deny");
    assert_eq!(err, PermissionError::ForbiddenRole);
}

#[test]
fn missing_grant_defaults_to_manage() {
    assert_eq!(effective_access(None), AccessLevel::Manage);
    let admin = admin_with(None);
    let allow = evaluate(&admin, Module::Requests, RequiredAccess::Manage).expect("default manage");
    assert!(allow.is_unrestricted());
}

#[test]
fn off_denies_read_and_manage() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Off,
        allowed: Vec::new(),
    }));
    for required in [RequiredAccess::Read, RequiredAccess::Manage] {
        let err = evaluate(&admin, Module::Requests, required).expect_err("off");
        assert_eq!(err, PermissionError::ModuleDisabled);
    }
}

#[test]
fn read_allows_read_denies_manage() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Read,
        allowed: Vec::new(),
    }));
    evaluate(&admin, Module::Requests, RequiredAccess::Read).expect("read ok");
    let err = evaluate(&admin, Module::Requests, RequiredAccess::Manage).expect_err("manage");
    assert_eq!(err, PermissionError::ReadOnly);
}

#[test]
fn manage_implies_read() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Manage,
        allowed: Vec::new(),
    }));
    evaluate(&admin, Module::Requests, RequiredAccess::Read).expect("read ok");
    evaluate(&admin, Module::Requests, RequiredAccess::Manage).expect("manage ok");
}

#[test]
fn empty_allow_list_is_unrestricted() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Manage,
        allowed: Vec::new(),
    }));
    let allow = evaluate(&admin, Module::Requests, RequiredAccess::Read).expect("allow");
    assert_eq!(allow, AllowList::Unrestricted);
    assert!(allow.permits("type-1"));
}

#[test]
fn non_empty_allow_list_is_closed() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Manage,
        allowed: vec!["type-1".to_string()],
    }));
    let allow = evaluate(&admin, Module::Requests, RequiredAccess::Read).expect("allow");
    assert!(allow.permits("type-1"));
    assert!(!allow.permits("type-2"));
}

#[test]
fn grants_scoped_per_module() {
    let admin = admin_with(Some(ModuleGrant {
        access: AccessLevel::Off,
        allowed: Vec::new(),
    }));
    // requests 关停不影响 services 的历史默认。
    evaluate(&admin, Module::Services, RequiredAccess::Manage).expect("services default");
    let err = evaluate(&admin, Module::Requests, RequiredAccess::Read).expect_err("requests off");
    assert_eq!(err, PermissionError::ModuleDisabled);
}
