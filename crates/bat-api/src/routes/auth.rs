//! 인증 API 라우트
//!
//! 로그인(토큰 발급), 토큰 상태 확인/갱신, 로그아웃을 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /auth/login` - 자격증명 검증 후 토큰 발급
//! - `GET /auth/token-check?renew=1` - 토큰 상태 확인 및 조건부 갱신
//! - `POST /auth/logout` - 자격증명 쿠키 제거

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{
        header::{HeaderMap, HeaderValue, SET_COOKIE},
        StatusCode,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use bat_core::BatError;

use crate::auth::{
    bearer_from_headers, issue_token, renew_if_due, CurrentIdentity, RenewalOutcome, TokenClaims,
};
use crate::error::{error_response, ApiErrorResponse, ApiResult};
use crate::services;
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 로그인 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// 사용자 이름
    pub username: String,
    /// 평문 비밀번호
    pub password: String,
}

/// 토큰 발급 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// 발급된 토큰 (쿠키에도 동일 값이 설정됨)
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// 토큰 상태 확인 쿼리.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenCheckQuery {
    /// 1이면 갱신 윈도우 안에 있는 토큰을 조용히 교체
    #[serde(default)]
    pub renew: i32,
}

/// 토큰 상태 확인 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenCheckResponse {
    /// 새 토큰이 발급되었는지 여부
    pub renewed: bool,
    /// 현재 유효한 claims (갱신되었으면 새 토큰의 claims)
    pub claims: TokenClaims,
}

// ================================================================================================
// Cookie Helpers
// ================================================================================================

/// 자격증명 쿠키 값 생성.
///
/// 전송 경계에서만 `"Bearer "` 스킴 접두어를 붙입니다.
fn credential_cookie(name: &str, token: &str, max_age_secs: i64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=Bearer {}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    ))
    .ok()
}

/// 자격증명 쿠키 제거 값 생성.
fn expired_cookie(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        name
    ))
    .ok()
}

// ================================================================================================
// Handlers
// ================================================================================================

/// POST /auth/login - 자격증명 검증 후 토큰 발급
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급 성공", body = TokenResponse),
        (status = 401, description = "잘못된 자격증명", body = ApiErrorResponse),
        (status = 404, description = "알 수 없는 사용자", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<TokenResponse>)> {
    let pool = state.pool().map_err(error_response)?;

    let identity = services::authenticate(pool, &input.username, &input.password)
        .await
        .map_err(error_response)?;

    let ttl = chrono::Duration::minutes(state.auth.token_ttl_minutes);
    let token = issue_token(&identity.id, ttl, &state.auth.secret).map_err(error_response)?;

    let max_age = state.auth.token_ttl_minutes * 60;
    let mut headers = HeaderMap::new();
    if let Some(cookie) = credential_cookie(&state.auth.cookie_name, &token, max_age) {
        headers.insert(SET_COOKIE, cookie);
    }

    info!(id = %identity.id, "login succeeded");

    Ok((
        headers,
        Json(TokenResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: max_age,
        }),
    ))
}

/// GET /auth/token-check - 토큰 상태 확인 및 조건부 갱신
///
/// 갱신 플래그가 켜져 있고 토큰이 갱신 윈도우 안에 있으면 동일 subject의
/// 새 토큰을 발급하고 교체 쿠키(`HttpOnly; Secure; SameSite=Lax`)를
/// 설정합니다. 그 외에는 현재 claims를 그대로 반환합니다. 만료된 토큰은
/// 401이며 비밀번호 재인증이 필요합니다.
#[utoipa::path(
    get,
    path = "/auth/token-check",
    params(
        ("renew" = i32, Query, description = "1이면 갱신 윈도우 안의 토큰을 교체")
    ),
    responses(
        (status = 200, description = "현재 또는 갱신된 claims", body = TokenCheckResponse),
        (status = 401, description = "만료/변조된 토큰", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn token_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenCheckQuery>,
    headers: HeaderMap,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<(HeaderMap, Json<TokenCheckResponse>)> {
    let token =
        bearer_from_headers(&headers, &state.auth.cookie_name).map_err(error_response)?;

    let outcome =
        renew_if_due(&token, query.renew == 1, &state.auth).map_err(error_response)?;

    let mut response_headers = HeaderMap::new();
    let body = match outcome {
        RenewalOutcome::Renewed { token, claims } => {
            let max_age = state.auth.token_ttl_minutes * 60;
            if let Some(cookie) = credential_cookie(&state.auth.cookie_name, &token, max_age) {
                response_headers.insert(SET_COOKIE, cookie);
            }
            info!(id = %identity.id, "token renewed");
            TokenCheckResponse {
                renewed: true,
                claims,
            }
        }
        RenewalOutcome::Unchanged(claims) => {
            debug!(id = %identity.id, "token unchanged");
            TokenCheckResponse {
                renewed: false,
                claims,
            }
        }
    };

    Ok((response_headers, Json(body)))
}

/// POST /auth/logout - 자격증명 쿠키 제거
///
/// 토큰 자체는 무효화되지 않습니다 (서버에 저장되지 않으므로). 저장된
/// 쿠키만 제거됩니다.
async fn logout(State(state): State<Arc<AppState>>) -> ApiResult<(HeaderMap, StatusCode)> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = expired_cookie(&state.auth.cookie_name) {
        headers.insert(SET_COOKIE, cookie);
    } else {
        return Err(error_response(BatError::Internal(
            "쿠키 헤더 생성 실패".to_string(),
        )));
    }

    Ok((headers, StatusCode::NO_CONTENT))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/token-check", get(token_check))
        .route("/logout", post(logout))
}
