use civic_auth::{PasswordVerdict, hash_password, verify_password};

#[test]
fn argon2_hash_verifies() {
    let hash = hash_password("owner123").expect("hash");
    let verdict = verify_password(&hash, "owner123").expect("verify");
    assert!(matches!(verdict, PasswordVerdict::Match));
}

#[test]
fn legacy_plaintext_upgrades() {
    let verdict = verify_password("owner123", "owner123").expect("verify");
    match verdict {
        PasswordVerdict::MatchNeedsRehash(hash) => assert!(hash.starts_with("$argon2")),
        other => panic!("expected rehash, got {other:?}"),
    }
}

#[test]
fn wrong_password_rejected() {
    let hash = hash_password("owner123").expect("hash");
    let verdict = verify_password(&hash, "bad").expect("verify");
    assert!(matches!(verdict, PasswordVerdict::Mismatch));

    let verdict = verify_password("owner123", "bad").expect("verify");
    assert!(matches!(verdict, PasswordVerdict::Mismatch));
}
