//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//!
//! 코어는 요청 간 세션 상태를 들고 있지 않습니다 - 아이덴티티/역할은
//! 매 권한 판정마다 저장소에서 다시 읽습니다. 여기 있는 것은 연결 풀과
//! 정책 설정뿐입니다.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bat_core::{AuthConfig, BatError, BatResult};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다. 전역 싱글턴 대신
/// 명시적으로 소유된 연결 풀을 전달합니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: Option<PgPool>,

    /// 인증 정책 설정 (비밀 키, 토큰 수명, 갱신 윈도우)
    pub auth: AuthConfig,

    /// API 버전
    pub version: String,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 새 상태를 생성합니다.
    pub fn new(db_pool: Option<PgPool>, auth: AuthConfig) -> Self {
        Self {
            db_pool,
            auth,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// 연결 풀 참조를 반환합니다.
    ///
    /// 풀이 구성되지 않았으면 `Database` 에러입니다.
    pub fn pool(&self) -> BatResult<&PgPool> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| BatError::Database("데이터베이스가 구성되지 않았습니다".to_string()))
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성.
///
/// 데이터베이스 없이 라우터 수준 테스트를 돌릴 때 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::new(
        None,
        AuthConfig {
            secret: "test-secret-key-for-state-testing-32-chars!".to_string(),
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_without_database() {
        let state = create_test_state();
        assert!(matches!(state.pool(), Err(BatError::Database(_))));
    }

    #[test]
    fn test_uptime_is_non_negative() {
        let state = create_test_state();
        assert!(state.uptime_secs() >= 0);
    }

    #[tokio::test]
    async fn test_db_health_without_pool() {
        let state = create_test_state();
        assert!(!state.is_db_healthy().await);
    }
}
