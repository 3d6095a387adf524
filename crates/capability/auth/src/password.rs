use crate::AuthError;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use subtle::ConstantTimeEq;

/// 口令校验结论。
#[derive(Debug)]
pub enum PasswordVerdict {
    Mismatch,
    Match,
    /// 旧格式（明文种子数据）匹配成功；附带应写回的 argon2 哈希。
    MatchNeedsRehash(String),
}

/// 生成 argon2 口令哈希。
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AuthError::Internal(err.to_string()))?;
    Ok(hash.to_string())
}

/// 校验口令；旧格式匹配时返回升级哈希。
pub fn verify_password(stored: &str, candidate: &str) -> Result<PasswordVerdict, AuthError> {
    if stored.starts_with("$argon2") {
        let parsed =
            PasswordHash::new(stored).map_err(|err| AuthError::Internal(err.to_string()))?;
        let verified = Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok();
        return Ok(if verified {
            PasswordVerdict::Match
        } else {
            PasswordVerdict::Mismatch
        });
    }

    // 常量时间比较，避免时序侧信道。
    let matched: bool = stored.as_bytes().ct_eq(candidate.as_bytes()).into();
    if !matched {
        return Ok(PasswordVerdict::Mismatch);
    }
    Ok(PasswordVerdict::MatchNeedsRehash(hash_password(candidate)?))
}
