//! 아이덴티티 서비스.
//!
//! 모든 저장소 접근을 권한 판정 뒤에 배치하는 비즈니스 로직입니다.
//! 저장소는 권한 판정이 성공한 다음에만 질의됩니다.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use bat_core::{
    authorize_update, can_view_directory, AuthConfig, BatError, BatResult, Identity, Role,
};

use crate::auth::{hash_password, verify_password};
use crate::repository::IdentityRepository;

// ================================================================================================
// Request Types
// ================================================================================================

/// 아이덴티티 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IdentityCreate {
    /// 불투명 식별자 (36자). 생략하면 서버가 생성합니다.
    #[validate(length(equal = 36))]
    pub id: Option<String>,
    /// 사용자 이름
    #[validate(length(min = 1))]
    pub username: String,
    /// 이메일
    #[validate(email)]
    pub email: String,
    /// 평문 비밀번호 (12~128자)
    #[validate(length(min = 12, max = 128))]
    pub password: String,
    /// 부여할 역할
    pub role: Role,
}

/// 아이덴티티 수정 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IdentityUpdate {
    /// 사용자 이름
    #[validate(length(min = 1))]
    pub username: String,
    /// 이메일
    #[validate(email)]
    pub email: String,
    /// 새 비밀번호. 생략하면 기존 해시를 유지합니다.
    #[validate(length(min = 12, max = 128))]
    pub password: Option<String>,
    /// 요청 역할 (기존과 같으면 역할 변경 검사는 생략됨)
    pub role: Role,
}

// ================================================================================================
// Operations
// ================================================================================================

/// 사용자 이름/비밀번호 인증.
///
/// 알 수 없는 사용자 이름은 `RecordNotFound`, 비밀번호 불일치는
/// `IncorrectCredentials`입니다.
pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> BatResult<Identity> {
    let identity = IdentityRepository::get_by_username(pool, username).await?;

    if !verify_password(password, &identity.password_hash) {
        return Err(BatError::IncorrectCredentials);
    }

    Ok(identity)
}

/// 아이덴티티 생성.
///
/// 행위자가 요청 역할을 부여할 수 있어야 합니다.
pub async fn create_identity(
    pool: &PgPool,
    actor: &Identity,
    input: IdentityCreate,
) -> BatResult<Identity> {
    if !actor.can_create(input.role) {
        return Err(BatError::Unauthorized(
            "cannot create this identity".to_string(),
        ));
    }

    let identity = Identity {
        id: input
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        username: input.username,
        email: input.email,
        password_hash: hash_password(&input.password)?,
        role: input.role,
    };

    let created = IdentityRepository::insert(pool, &identity).await?;
    info!(id = %created.id, role = %created.role, "identity created");

    Ok(created)
}

/// 아이덴티티 조회.
pub async fn get_identity(pool: &PgPool, id: &str) -> BatResult<Identity> {
    IdentityRepository::get(pool, id).await
}

/// 아이덴티티 디렉터리 조회.
pub async fn list_identities(pool: &PgPool, actor: &Identity) -> BatResult<Vec<Identity>> {
    if !can_view_directory(actor) {
        return Err(BatError::Unauthorized(
            "cannot list identities, insufficient rights".to_string(),
        ));
    }

    IdentityRepository::list_all(pool).await
}

/// 아이덴티티 수정.
///
/// 수정 권한과 역할 변경 규칙을 한 번에 판정한 뒤에만 저장소를
/// 갱신합니다. 새 비밀번호가 있을 때만 재해싱합니다.
pub async fn update_identity(
    pool: &PgPool,
    actor: &Identity,
    id: &str,
    input: IdentityUpdate,
) -> BatResult<Identity> {
    let target = IdentityRepository::get(pool, id).await?;

    authorize_update(actor, &target, input.role)?;

    let password_hash = match &input.password {
        Some(password) => hash_password(password)?,
        None => target.password_hash.clone(),
    };

    let updated = Identity {
        id: target.id.clone(),
        username: input.username,
        email: input.email,
        password_hash,
        role: input.role,
    };

    let result = IdentityRepository::update(pool, &updated).await?;
    info!(id = %result.id, "identity updated");

    Ok(result)
}

/// 아이덴티티 삭제.
pub async fn delete_identity(pool: &PgPool, actor: &Identity, id: &str) -> BatResult<Identity> {
    let target = IdentityRepository::get(pool, id).await?;

    if !actor.can_delete(&target) {
        return Err(BatError::Unauthorized(
            "cannot perform this action".to_string(),
        ));
    }

    let deleted = IdentityRepository::delete(pool, id).await?;
    info!(id = %deleted.id, "identity deleted");

    Ok(deleted)
}

/// 초기 관리자 시드.
///
/// 아이덴티티 테이블이 비어 있고 설정에 초기 관리자 자격증명이 있으면
/// admin 아이덴티티 하나를 만듭니다. 부트스트랩 경로라 행위자 검사가
/// 없습니다 - 이후의 모든 생성은 [`create_identity`]를 거칩니다.
pub async fn ensure_default_admin(pool: &PgPool, auth: &AuthConfig) -> BatResult<Option<Identity>> {
    if IdentityRepository::count(pool).await? > 0 {
        return Ok(None);
    }

    let (Some(username), Some(email), Some(password)) = (
        auth.default_admin_username.as_deref(),
        auth.default_admin_email.as_deref(),
        auth.default_admin_password.as_deref(),
    ) else {
        warn!("아이덴티티 테이블이 비어 있지만 초기 관리자 설정이 없습니다");
        return Ok(None);
    };

    let admin = Identity {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
    };

    let created = IdentityRepository::insert(pool, &admin).await?;
    info!(id = %created.id, "default admin seeded");

    Ok(Some(created))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_validation() {
        let valid = IdentityCreate {
            id: None,
            username: "coach-one".to_string(),
            email: "coach@example.com".to_string(),
            password: "LongEnoughPassword1!".to_string(),
            role: Role::Coach,
        };
        assert!(valid.validate().is_ok());

        let short_password = IdentityCreate {
            password: "short".to_string(),
            ..valid_input()
        };
        assert!(short_password.validate().is_err());

        let bad_email = IdentityCreate {
            email: "not-an-email".to_string(),
            ..valid_input()
        };
        assert!(bad_email.validate().is_err());

        let bad_id = IdentityCreate {
            id: Some("too-short".to_string()),
            ..valid_input()
        };
        assert!(bad_id.validate().is_err());
    }

    #[test]
    fn test_update_password_is_optional() {
        let update = IdentityUpdate {
            username: "coach-one".to_string(),
            email: "coach@example.com".to_string(),
            password: None,
            role: Role::Coach,
        };
        assert!(update.validate().is_ok());

        let with_short = IdentityUpdate {
            password: Some("short".to_string()),
            ..update
        };
        assert!(with_short.validate().is_err());
    }

    fn valid_input() -> IdentityCreate {
        IdentityCreate {
            id: None,
            username: "coach-one".to_string(),
            email: "coach@example.com".to_string(),
            password: "LongEnoughPassword1!".to_string(),
            role: Role::Coach,
        }
    }
}
