//! 서명된 Bearer 토큰 처리.
//!
//! 토큰 발급/검증, 만료 상태 분류, 갱신 오케스트레이션 로직.
//! 토큰은 서버에 저장되지 않습니다 - 유효성은 검증 시점의 서명과
//! `exp`만의 함수입니다. "갱신된" 토큰은 동일 subject로 새로 발급된
//! 완전히 새로운 토큰입니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use bat_core::{AuthConfig, BatError, BatResult};

/// Bearer 토큰 페이로드.
///
/// `sub`는 선택적입니다 - 형식은 유효하지만 subject가 없는 토큰을
/// 표현할 수 있어야 하며, 이 경우 subject 추출은 에러가 아니라 부재로
/// 처리됩니다.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TokenClaims {
    /// Subject - 아이덴티티 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued At - 발급 시각 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 만료 시각 (Unix timestamp), 항상 `iat + ttl`
    pub exp: i64,
}

impl TokenClaims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `subject_id` - 아이덴티티 ID
    /// * `ttl` - 수명. 테스트에서 이미 만료된 토큰을 만들 수 있도록
    ///   음수도 허용합니다.
    pub fn new(subject_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: Some(subject_id.into()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// 만료까지 남은 시간 (초). 음수면 이미 만료.
    pub fn remaining_secs(&self) -> i64 {
        self.exp - Utc::now().timestamp()
    }
}

/// 토큰 만료 상태.
///
/// 불리언이 아닌 3-상태 분류입니다. UI 상태 확인용이며, 접근 제어
/// 판정에는 [`decode_token`]의 엄격 경로만 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    /// 만료됨 - 또는 디코딩 자체가 불가능한 토큰 (연성 분류)
    Expired,
    /// 갱신 대상 - 남은 수명이 갱신 윈도우 안으로 들어옴
    RenewalDue,
    /// 유효
    Valid,
}

/// 토큰 갱신 결과.
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    /// 기존 토큰 유지 - 새 토큰은 발급되지 않음
    Unchanged(TokenClaims),
    /// 동일 subject로 새 토큰 발급 - 호출자는 저장된 자격증명을 교체해야 함
    Renewed {
        /// 새로 발급된 토큰
        token: String,
        /// 새 토큰의 claims
        claims: TokenClaims,
    },
}

/// 토큰 발급.
///
/// `{sub, iat, exp = iat + ttl}`을 서버 비밀 키로 HS256 서명합니다.
/// 시간/비밀 키/입력만의 순수 함수이며 부수효과가 없습니다.
/// `"Bearer "` 스킴 접두어는 전송 경계(쿠키/헤더)에서만 붙습니다.
pub fn issue_token(subject_id: &str, ttl: Duration, secret: &str) -> BatResult<String> {
    let claims = TokenClaims::new(subject_id, ttl);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| BatError::Internal(format!("토큰 인코딩 실패: {}", e)))
}

/// 토큰 디코딩 및 검증 (엄격 경로).
///
/// 보호된 라우트가 사용하는 경로입니다. leeway 없이 `exp <= now`면
/// `InvalidToken("expired")`, 서명 불일치/페이로드 손상이면
/// `InvalidToken("tampered or malformed")`로 실패합니다.
pub fn decode_token(token: &str, secret: &str) -> BatResult<TokenClaims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            BatError::InvalidToken("expired".to_string())
        }
        _ => BatError::InvalidToken("tampered or malformed".to_string()),
    })
}

/// claims에서 subject 추출.
///
/// subject claim이 없는 경우는 에러가 아니라 부재(None)입니다.
pub fn extract_subject(claims: &TokenClaims) -> Option<&str> {
    claims.sub.as_deref()
}

/// 남은 수명(초)을 3-상태로 분류합니다.
///
/// 경계 규칙:
/// - 정확히 0초 남음은 `Expired` (`<=`)
/// - 정확히 `renewal_window_secs` 남음은 `Valid` (상한은 배타적 `<`)
pub fn classify_remaining(remaining_secs: i64, renewal_window_secs: i64) -> ExpiryStatus {
    if remaining_secs <= 0 {
        ExpiryStatus::Expired
    } else if remaining_secs < renewal_window_secs {
        ExpiryStatus::RenewalDue
    } else {
        ExpiryStatus::Valid
    }
}

/// 토큰 만료 상태 분류 (연성 경로).
///
/// 디코딩/서명 검증에 실패하는 토큰은 에러를 올리지 않고 `Expired`로
/// 강등합니다. 상태 확인 호출자가 일관된 3-상태 결과를 받도록 하기 위한
/// 것으로, 접근 제어 판정에는 절대 사용하지 않습니다.
pub fn classify_expiry(token: &str, secret: &str, renewal_window_secs: i64) -> ExpiryStatus {
    // 만료 검사는 끄고 서명/형식만 검증한다. exp claim 자체는 필수이므로
    // exp가 없는 토큰은 여기서 실패하고 Expired로 분류된다.
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let claims = match decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(_) => return ExpiryStatus::Expired,
    };

    classify_remaining(claims.remaining_secs(), renewal_window_secs)
}

/// 갱신 오케스트레이션.
///
/// - 상태가 `Expired`면 갱신을 거부합니다. 호출자는 비밀번호로 다시
///   인증해야 하며 이 경로는 재시도되지 않습니다.
/// - 플래그가 꺼져 있거나 상태가 `Valid`면 기존 claims를 그대로
///   돌려주고 새 토큰은 발급하지 않습니다.
/// - 플래그가 켜져 있고 상태가 `RenewalDue`면 동일 subject로 새 토큰을
///   발급합니다. 기존 토큰은 자체 만료 시각까지 계속 유효합니다 -
///   단일 활성 토큰 불변식은 없습니다.
pub fn renew_if_due(
    token: &str,
    renew_requested: bool,
    auth: &AuthConfig,
) -> BatResult<RenewalOutcome> {
    let status = classify_expiry(token, &auth.secret, auth.renewal_window_secs);

    if status == ExpiryStatus::Expired {
        return Err(BatError::InvalidToken("expired".to_string()));
    }

    let claims = decode_token(token, &auth.secret)?;

    if !renew_requested || status == ExpiryStatus::Valid {
        return Ok(RenewalOutcome::Unchanged(claims));
    }

    let subject = extract_subject(&claims)
        .ok_or_else(|| BatError::InvalidToken("missing subject".to_string()))?;

    let new_token = issue_token(
        subject,
        Duration::minutes(auth.token_ttl_minutes),
        &auth.secret,
    )?;
    let new_claims = decode_token(&new_token, &auth.secret)?;

    Ok(RenewalOutcome::Renewed {
        token: new_token,
        claims: new_claims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-token-testing-minimum-32-chars";

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            secret: TEST_SECRET.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_issue_and_decode_round_trip() {
        let token = issue_token("identity-123", Duration::minutes(15), TEST_SECRET).unwrap();

        let claims = decode_token(&token, TEST_SECRET).unwrap();
        assert_eq!(extract_subject(&claims), Some("identity-123"));
        assert_eq!(claims.exp, claims.iat + 15 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = issue_token("identity-123", Duration::hours(-1), TEST_SECRET).unwrap();

        let err = decode_token(&token, TEST_SECRET).unwrap_err();
        match err {
            BatError::InvalidToken(reason) => assert!(reason.contains("expired")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let token = issue_token("identity-123", Duration::minutes(15), TEST_SECRET).unwrap();
        let tampered = format!("{}TAMPERED", &token[..token.len() - 8]);

        let err = decode_token(&tampered, TEST_SECRET).unwrap_err();
        match err {
            BatError::InvalidToken(reason) => assert!(reason.contains("tampered")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token("identity-123", Duration::minutes(15), TEST_SECRET).unwrap();

        let result = decode_token(&token, "another-secret-key-for-testing-32-chars!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_subject_is_absent_not_error() {
        // subject 없는 토큰을 직접 인코딩
        let claims = TokenClaims {
            sub: None,
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::minutes(10)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let decoded = decode_token(&token, TEST_SECRET).unwrap();
        assert_eq!(extract_subject(&decoded), None);
    }

    #[test]
    fn test_classify_remaining_boundaries() {
        // 갱신 윈도우 경계는 배타적, 만료 경계는 포함
        assert_eq!(classify_remaining(180, 180), ExpiryStatus::Valid);
        assert_eq!(classify_remaining(179, 180), ExpiryStatus::RenewalDue);
        assert_eq!(classify_remaining(1, 180), ExpiryStatus::RenewalDue);
        assert_eq!(classify_remaining(0, 180), ExpiryStatus::Expired);
        assert_eq!(classify_remaining(-1, 180), ExpiryStatus::Expired);
    }

    #[test]
    fn test_classify_expiry_states() {
        let valid = issue_token("id", Duration::minutes(10), TEST_SECRET).unwrap();
        assert_eq!(classify_expiry(&valid, TEST_SECRET, 180), ExpiryStatus::Valid);

        let due = issue_token("id", Duration::seconds(120), TEST_SECRET).unwrap();
        assert_eq!(
            classify_expiry(&due, TEST_SECRET, 180),
            ExpiryStatus::RenewalDue
        );

        let expired = issue_token("id", Duration::seconds(-10), TEST_SECRET).unwrap();
        assert_eq!(
            classify_expiry(&expired, TEST_SECRET, 180),
            ExpiryStatus::Expired
        );
    }

    #[test]
    fn test_classify_expiry_degrades_garbage_to_expired() {
        assert_eq!(
            classify_expiry("not.a.token", TEST_SECRET, 180),
            ExpiryStatus::Expired
        );
        assert_eq!(classify_expiry("", TEST_SECRET, 180), ExpiryStatus::Expired);
    }

    #[test]
    fn test_classify_expiry_token_without_exp() {
        // exp가 없는 토큰은 연성 경로에서 Expired로 강등
        #[derive(Serialize)]
        struct NoExp {
            sub: String,
        }
        let token = encode(
            &Header::default(),
            &NoExp {
                sub: "id".to_string(),
            },
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            classify_expiry(&token, TEST_SECRET, 180),
            ExpiryStatus::Expired
        );
    }

    #[test]
    fn test_renewal_mints_for_due_token() {
        let auth = test_auth_config();
        let old = issue_token("identity-123", Duration::seconds(120), TEST_SECRET).unwrap();
        let old_claims = decode_token(&old, TEST_SECRET).unwrap();

        match renew_if_due(&old, true, &auth).unwrap() {
            RenewalOutcome::Renewed { token, claims } => {
                assert_ne!(token, old);
                // subject 보존, 만료는 연장
                assert_eq!(claims.sub, old_claims.sub);
                assert!(claims.exp > old_claims.exp);
            }
            RenewalOutcome::Unchanged(_) => panic!("expected renewal"),
        }
    }

    #[test]
    fn test_renewal_refused_when_valid() {
        let auth = test_auth_config();
        let token = issue_token("identity-123", Duration::minutes(10), TEST_SECRET).unwrap();

        match renew_if_due(&token, true, &auth).unwrap() {
            RenewalOutcome::Unchanged(claims) => {
                assert_eq!(extract_subject(&claims), Some("identity-123"));
            }
            RenewalOutcome::Renewed { .. } => panic!("valid token must not be renewed"),
        }
    }

    #[test]
    fn test_renewal_refused_without_flag() {
        let auth = test_auth_config();
        let token = issue_token("identity-123", Duration::seconds(120), TEST_SECRET).unwrap();

        match renew_if_due(&token, false, &auth).unwrap() {
            RenewalOutcome::Unchanged(_) => {}
            RenewalOutcome::Renewed { .. } => panic!("renewal without flag must not mint"),
        }
    }

    #[test]
    fn test_renewal_fatal_when_expired() {
        let auth = test_auth_config();
        let token = issue_token("identity-123", Duration::seconds(-10), TEST_SECRET).unwrap();

        let err = renew_if_due(&token, true, &auth).unwrap_err();
        assert!(matches!(err, BatError::InvalidToken(_)));
    }
}
