//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/auth/login` - 토큰 발급
//! - `/auth/token-check` - 토큰 상태 확인 및 조건부 갱신
//! - `/auth/logout` - 자격증명 쿠키 제거
//! - `/api/v1/users` - 아이덴티티 관리
//! - `/api/v1/assessments` - 평가 리소스 및 협업자 부여

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub mod assessments;
pub mod auth;
pub mod health;
pub mod users;

pub use assessments::{
    assessments_router, AssessmentCreate, AssessmentListResponse, CollaboratorListResponse,
    GrantRequest, GrantResponse, RevokeResponse,
};
pub use auth::{auth_router, LoginRequest, TokenCheckResponse, TokenResponse};
pub use health::{health_router, HealthResponse};
pub use users::{users_router, UserListResponse};

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 인증 엔드포인트
        .nest("/auth", auth_router())
        // API v1 엔드포인트
        .nest("/api/v1/users", users_router())
        .nest("/api/v1/assessments", assessments_router())
}
