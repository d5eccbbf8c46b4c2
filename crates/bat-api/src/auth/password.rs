//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::warn;

use bat_core::{BatError, BatResult};

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘과 매 호출마다 새로 생성되는 랜덤 솔트를 사용합니다.
/// 같은 평문을 두 번 해싱하면 서로 다른 저장값이 나오므로, 동등성은
/// 반드시 [`verify_password`]로 확인해야 하며 해시 문자열을 직접 비교하면
/// 안 됩니다.
///
/// # Arguments
///
/// * `password` - 해싱할 평문 비밀번호
///
/// # Returns
///
/// PHC 형식의 해시 문자열 (솔트 포함, 예: `$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> BatResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BatError::Internal(format!("비밀번호 해싱 실패: {}", e)))
}

/// 비밀번호 검증.
///
/// 평문이 저장된 해시를 재현하면 true를 반환합니다. 저장 해시가 손상된
/// 형식이면 경고 로그 후 false입니다 - 검증 경로는 절대 패닉하지 않습니다.
///
/// 빈 비밀번호는 비어 있지 않은 비밀번호의 해시에 대해 항상 false입니다.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "저장된 비밀번호 해시 형식이 유효하지 않습니다");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
