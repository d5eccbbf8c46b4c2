//! Axum용 인증 추출기.
//!
//! 전송 경계에서 Bearer 자격증명을 꺼내고, 보호된 라우트가 사용할
//! 현재 아이덴티티를 저장소에서 복원합니다.
//!
//! 자격증명은 `Authorization` 헤더 또는 `access_token` 쿠키로 전달되며
//! 두 경우 모두 `"Bearer <token>"` 형식입니다. 헤더가 우선합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    Json,
};

use bat_core::{BatError, BatResult, Identity};

use crate::auth::token::{decode_token, extract_subject, TokenClaims};
use crate::error::{error_response, ApiErrorResponse};
use crate::repository::IdentityRepository;
use crate::state::AppState;

/// 요청에서 원시 Bearer 토큰을 추출합니다.
///
/// `Authorization` 헤더를 먼저 보고, 없으면 쿠키에서 찾습니다.
/// 반환값은 `"Bearer "` 접두어가 제거된 불투명 토큰 문자열입니다.
pub fn bearer_from_headers(headers: &HeaderMap, cookie_name: &str) -> BatResult<String> {
    if let Some(header) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        return header
            .strip_prefix("Bearer ")
            .map(|t| t.to_string())
            .ok_or_else(|| BatError::InvalidToken("malformed authorization header".to_string()));
    }

    if let Some(value) = cookie_value(headers, cookie_name) {
        // 쿠키는 스킴 접두어를 포함한 채 저장된다
        let token = value.strip_prefix("Bearer ").unwrap_or(&value);
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }

    Err(BatError::InvalidToken("missing credential".to_string()))
}

/// 쿠키 헤더에서 특정 쿠키 값을 찾습니다.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())?
        .split(';')
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .next()
}

/// 토큰 인증 추출기.
///
/// 엄격 디코딩 경로입니다. 만료/변조된 토큰은 401로 거부됩니다.
#[derive(Debug, Clone)]
pub struct TokenAuth(pub TokenClaims);

impl FromRequestParts<Arc<AppState>> for TokenAuth {
    type Rejection = (StatusCode, Json<ApiErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_from_headers(&parts.headers, &state.auth.cookie_name).map_err(error_response)?;
        let claims = decode_token(&token, &state.auth.secret).map_err(error_response)?;

        Ok(TokenAuth(claims))
    }
}

/// 현재 아이덴티티 추출기.
///
/// 토큰의 subject로 저장소에서 아이덴티티를 다시 읽습니다. 역할 상태는
/// 요청마다 최신 커밋 값으로 복원되며 요청 간에 캐시되지 않습니다.
///
/// subject가 없거나 저장소에 더 이상 존재하지 않는 아이덴티티를
/// 가리키는 토큰은 401입니다.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl FromRequestParts<Arc<AppState>> for CurrentIdentity {
    type Rejection = (StatusCode, Json<ApiErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TokenAuth(claims) = TokenAuth::from_request_parts(parts, state).await?;

        let subject = extract_subject(&claims)
            .ok_or_else(|| {
                error_response(BatError::InvalidToken("missing subject".to_string()))
            })?
            .to_string();

        let pool = state.pool().map_err(error_response)?;
        let identity = IdentityRepository::get(pool, &subject)
            .await
            .map_err(|e| match e {
                BatError::RecordNotFound(_) => {
                    error_response(BatError::InvalidToken("unknown subject".to_string()))
                }
                other => error_response(other),
            })?;

        Ok(CurrentIdentity(identity))
    }
}
