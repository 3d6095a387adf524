use civic_auth::JwtManager;

#[test]
fn jwt_issue_and_verify() {
    let jwt = JwtManager::new("secret".to_string(), 3600);
    let issued = jwt.issue("user-1").expect("token");
    let user_id = jwt.verify(&issued.token).expect("verify");
    assert_eq!(user_id, "user-1");
}

#[test]
fn jwt_rejects_foreign_secret() {
    let jwt = JwtManager::new("secret".to_string(), 3600);
    let other = JwtManager::new("other".to_string(), 3600);
    let issued = jwt.issue("user-1").expect("token");
    other.verify(&issued.token).expect_err("signature mismatch");
}
