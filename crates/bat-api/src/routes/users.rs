//! 사용자 관리 API 라우트
//!
//! 아이덴티티 CRUD를 제공합니다. 모든 연산은 역할 계층 판정을 거친
//! 뒤에만 저장소에 닿습니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/users` - 디렉터리 조회 (admin/coach)
//! - `POST /api/v1/users` - 아이덴티티 생성
//! - `GET /api/v1/users/{id}` - 아이덴티티 조회
//! - `PUT /api/v1/users/{id}` - 아이덴티티 수정
//! - `DELETE /api/v1/users/{id}` - 아이덴티티 삭제

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use bat_core::{Identity, Role};

use crate::auth::CurrentIdentity;
use crate::error::{error_response, ApiErrorResponse, ApiResult};
use crate::services::{self, IdentityCreate, IdentityUpdate};
use crate::state::AppState;

// ================================================================================================
// Response Types
// ================================================================================================

/// 디렉터리 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    /// 아이덴티티 목록 (비밀번호 해시는 직렬화되지 않음)
    pub users: Vec<Identity>,
    /// 총 개수
    pub total: usize,
    /// 요청 행위자가 부여할 수 있는 역할 집합
    pub grantable_roles: Vec<Role>,
}

/// 요청 본문 검증 실패를 400으로 매핑합니다.
fn validation_error(e: validator::ValidationErrors) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("VALIDATION_ERROR", e.to_string())),
    )
}

// ================================================================================================
// Handlers
// ================================================================================================

/// GET /api/v1/users - 디렉터리 조회
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "아이덴티티 디렉터리", body = UserListResponse),
        (status = 401, description = "유효하지 않은 자격증명", body = ApiErrorResponse),
        (status = 403, description = "열람 권한 없음", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
) -> ApiResult<Json<UserListResponse>> {
    debug!(actor = %actor.id, "listing identities");

    let pool = state.pool().map_err(error_response)?;
    let users = services::list_identities(pool, &actor)
        .await
        .map_err(error_response)?;

    let total = users.len();
    Ok(Json(UserListResponse {
        users,
        total,
        grantable_roles: actor.grantable_roles().to_vec(),
    }))
}

/// POST /api/v1/users - 아이덴티티 생성
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = IdentityCreate,
    responses(
        (status = 201, description = "생성됨", body = Identity),
        (status = 403, description = "역할 부여 권한 없음", body = ApiErrorResponse),
        (status = 409, description = "username/email 충돌", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Json(input): Json<IdentityCreate>,
) -> ApiResult<(StatusCode, Json<Identity>)> {
    input.validate().map_err(validation_error)?;

    let pool = state.pool().map_err(error_response)?;
    let created = services::create_identity(pool, &actor, input)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/users/{id} - 아이덴티티 조회
async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(_actor): CurrentIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Identity>> {
    let pool = state.pool().map_err(error_response)?;
    let identity = services::get_identity(pool, &id)
        .await
        .map_err(error_response)?;

    Ok(Json(identity))
}

/// PUT /api/v1/users/{id} - 아이덴티티 수정
async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<String>,
    Json(input): Json<IdentityUpdate>,
) -> ApiResult<Json<Identity>> {
    input.validate().map_err(validation_error)?;

    let pool = state.pool().map_err(error_response)?;
    let updated = services::update_identity(pool, &actor, &id, input)
        .await
        .map_err(error_response)?;

    Ok(Json(updated))
}

/// DELETE /api/v1/users/{id} - 아이덴티티 삭제
async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Identity>> {
    let pool = state.pool().map_err(error_response)?;
    let deleted = services::delete_identity(pool, &actor, &id)
        .await
        .map_err(error_response)?;

    Ok(Json(deleted))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
