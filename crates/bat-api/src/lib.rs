//! REST API 및 권한 코어 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - Argon2 비밀번호 검증 및 서명된 Bearer 토큰 수명주기
//! - 만료 임박 토큰의 조용한 갱신
//! - 역할 계층 기반 권한 엔진과 리소스 부여 오버레이의 HTTP 표면
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호/토큰 처리 및 요청 추출기
//! - [`repository`]: 아이덴티티/평가/부여 저장소 연산
//! - [`services`]: 권한 판정 뒤에 저장소를 두는 비즈니스 로직
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    classify_expiry, classify_remaining, decode_token, extract_subject, hash_password,
    issue_token, renew_if_due, verify_password, CurrentIdentity, ExpiryStatus, RenewalOutcome,
    TokenAuth, TokenClaims,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use openapi::swagger_ui_router;
pub use routes::create_api_router;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
