//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! 코어의 [`BatError`] 분류는 여기서 HTTP 상태로 매핑됩니다:
//!
//! | 분류 | 상태 |
//! |---|---|
//! | `IncorrectCredentials`, `InvalidToken` | 401 |
//! | `Unauthorized` | 403 |
//! | `RecordNotFound` | 404 |
//! | `Conflict` | 409 |
//! | 그 외 | 500 |

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use bat_core::BatError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "권한 없음: cannot modify this identity",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_TOKEN", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 코어 에러를 HTTP 응답으로 변환합니다.
///
/// 권한 거부는 항상 403으로 관측 가능하게 전달됩니다 - no-op 성공으로
/// 강등되는 경로는 없습니다.
pub fn error_response(err: BatError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match &err {
        BatError::IncorrectCredentials => (StatusCode::UNAUTHORIZED, "INCORRECT_CREDENTIALS"),
        BatError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
        BatError::Unauthorized(_) => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        BatError::RecordNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        BatError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        BatError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR"),
        BatError::Config(_) | BatError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };

    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_errors_map_to_401() {
        let (status, _) = error_response(BatError::IncorrectCredentials);
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = error_response(BatError::InvalidToken("expired".to_string()));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.code, "INVALID_TOKEN");
    }

    #[test]
    fn test_denial_maps_to_403() {
        let (status, body) = error_response(BatError::Unauthorized("denied".to_string()));
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.code, "UNAUTHORIZED");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, _) = error_response(BatError::RecordNotFound("identity".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let (status, _) = error_response(BatError::Conflict("username taken".to_string()));
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_infrastructure_errors_map_to_500() {
        let (status, _) = error_response(BatError::Database("connection lost".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = error_response(BatError::Internal("boom".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_serialization_omits_empty_timestamp() {
        let err = ApiErrorResponse {
            code: "NOT_FOUND".to_string(),
            message: "missing".to_string(),
            timestamp: None,
        };
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("timestamp"));
    }
}
