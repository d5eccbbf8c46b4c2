//! 코칭 플랫폼의 에러 타입.
//!
//! 이 모듈은 자격증명/권한 코어 전반에서 사용되는 닫힌 에러 타입을 정의합니다.
//! 모든 에러는 현재 요청에 대해 종료적(terminal)이며 내부에서 재시도하지 않습니다.

use thiserror::Error;

/// 핵심 플랫폼 에러.
///
/// 인증/권한 분류(`IncorrectCredentials`, `InvalidToken`, `RecordNotFound`,
/// `Unauthorized`)와 인프라 분류(`Conflict`, `Database`, `Config`, `Internal`)로
/// 구성됩니다. 문자열 매칭 대신 variant 매칭으로 처리하세요.
#[derive(Debug, Error)]
pub enum BatError {
    /// 비밀번호 검증 실패
    #[error("잘못된 자격증명입니다")]
    IncorrectCredentials,

    /// 서명 실패, 페이로드 손상 또는 만료된 토큰
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(String),

    /// 아이덴티티 또는 리소스를 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    RecordNotFound(String),

    /// 권한 엔진의 거부
    #[error("권한 없음: {0}")]
    Unauthorized(String),

    /// 고유 제약 충돌 (username/email/grant 중복)
    #[error("충돌: {0}")]
    Conflict(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 플랫폼 작업을 위한 Result 타입.
pub type BatResult<T> = Result<T, BatError>;

impl BatError {
    /// 자격증명 재제시(재로그인)로만 해소되는 에러인지 확인합니다.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            BatError::IncorrectCredentials | BatError::InvalidToken(_)
        )
    }

    /// 권한 거부인지 확인합니다.
    ///
    /// 거부는 절대 no-op 성공으로 강등되지 않고 호출자에게 그대로 전달됩니다.
    pub fn is_denial(&self) -> bool {
        matches!(self, BatError::Unauthorized(_))
    }
}

impl From<serde_json::Error> for BatError {
    fn from(err: serde_json::Error) -> Self {
        BatError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for BatError {
    fn from(err: config::ConfigError) -> Self {
        BatError::Config(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for BatError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => BatError::RecordNotFound("record".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BatError::Conflict(db.to_string())
            }
            other => BatError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_reauth() {
        assert!(BatError::IncorrectCredentials.requires_reauth());
        assert!(BatError::InvalidToken("expired".to_string()).requires_reauth());

        assert!(!BatError::Unauthorized("denied".to_string()).requires_reauth());
        assert!(!BatError::RecordNotFound("user".to_string()).requires_reauth());
    }

    #[test]
    fn test_is_denial() {
        assert!(BatError::Unauthorized("cannot modify".to_string()).is_denial());
        assert!(!BatError::IncorrectCredentials.is_denial());
        assert!(!BatError::Database("timeout".to_string()).is_denial());
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let bat: BatError = err.into();
        assert!(matches!(bat, BatError::Internal(_)));
    }
}
