//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bat_core::{Assessment, Identity, ResourceGrant, Role};

use crate::auth::TokenClaims;
use crate::error::ApiErrorResponse;
use crate::routes::{
    AssessmentCreate, AssessmentListResponse, CollaboratorListResponse, GrantRequest,
    GrantResponse, HealthResponse, LoginRequest, RevokeResponse, TokenCheckResponse,
    TokenResponse, UserListResponse,
};
use crate::services::{IdentityCreate, IdentityUpdate};
use crate::state::AppState;

/// BAT API 문서.
///
/// 자격증명/권한 코어의 엔드포인트와 스키마를 포함하는 OpenAPI 3.0
/// 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BAT Coaching Platform API",
        version = "0.1.0",
        description = r#"
코칭/평가 플랫폼의 자격증명 및 권한 코어 REST API입니다.

## 주요 기능

- **인증**: 비밀번호 검증 및 서명된 Bearer 토큰 발급
- **토큰 갱신**: 만료 임박 토큰의 조용한 교체 (갱신 윈도우 180초)
- **권한**: 역할 계층 (admin ≻ coach ≻ user) 기반 접근 제어
- **협업자**: 평가 리소스별 접근 부여/철회

## 인증

`Authorization: Bearer <token>` 헤더 또는 `access_token` 쿠키를
사용합니다. 401은 재인증, 403은 권한 부족을 의미합니다.
"#
    ),
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Auth =====
        crate::routes::auth::login,
        crate::routes::auth::token_check,

        // ===== Users =====
        crate::routes::users::list_users,
        crate::routes::users::create_user,
    ),
    components(schemas(
        ApiErrorResponse,
        HealthResponse,
        LoginRequest,
        TokenResponse,
        TokenCheckResponse,
        TokenClaims,
        Role,
        Identity,
        IdentityCreate,
        IdentityUpdate,
        UserListResponse,
        Assessment,
        ResourceGrant,
        AssessmentCreate,
        AssessmentListResponse,
        GrantRequest,
        GrantResponse,
        RevokeResponse,
        CollaboratorListResponse,
    )),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "auth", description = "인증 및 토큰 수명주기"),
        (name = "users", description = "아이덴티티 관리")
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router() -> Router<Arc<AppState>> {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();

        assert!(json.contains("BAT Coaching Platform API"));
        assert!(json.contains("/auth/token-check"));
        assert!(json.contains("/api/v1/users"));
    }
}
