//! 아이덴티티 및 역할 기반 권한 모델.
//!
//! 이 모듈은 권한 엔진의 핵심을 정의합니다:
//! - `Role` - 닫힌 역할 집합 (admin ≻ coach ≻ user)
//! - `Identity` - 자격증명이 바인딩된 사용자 아이덴티티
//! - 생성/삭제/수정 권한 판정 및 역할 변경 검증
//!
//! 역할 지배 관계는 선언 순서가 아닌 명시적 `rank()` 함수로 정의됩니다.
//! 새 역할이 enum 중간에 삽입되어도 판정이 조용히 깨지지 않습니다.

use serde::{Deserialize, Serialize};

use crate::error::{BatError, BatResult};

/// 사용자 역할.
///
/// 전순서 지배 체인 `admin ≻ coach ≻ user`를 형성합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx-support",
    sqlx(type_name = "text", rename_all = "lowercase")
)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 모든 아이덴티티와 리소스에 대한 권한 보유
    Admin,
    /// 코치 - 코치/일반 사용자 및 평가 리소스 관리 권한
    Coach,
    /// 일반 사용자 - 자기 자신의 데이터만
    User,
}

impl Role {
    /// 역할의 지배 순위를 반환합니다 (높을수록 상위).
    ///
    /// 지배 판정은 항상 이 함수를 통합니다. enum 선언 순서에 의존하지 않습니다.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Coach => 50,
            Role::User => 10,
        }
    }

    /// `self`가 `other`를 엄격하게 지배하는지 확인합니다.
    ///
    /// 동일 역할은 지배하지 않습니다. 임의의 두 역할에 대해
    /// `a.dominates(b)`, `b.dominates(a)`, `a == b` 중 정확히 하나가 성립합니다.
    pub fn dominates(&self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// 이 역할의 행위자가 부여할 수 있는 역할 집합을 반환합니다.
    ///
    /// 행위자 자신의 역할보다 상위 역할은 구조적으로 포함될 수 없으므로
    /// 자기 승격은 불가능합니다.
    pub fn grantable(&self) -> &'static [Role] {
        match self {
            Role::Admin => &[Role::Admin, Role::Coach, Role::User],
            Role::Coach => &[Role::Coach, Role::User],
            Role::User => &[],
        }
    }

    /// 이 역할의 행위자가 `target`을 부여할 수 있는지 확인합니다.
    pub fn can_grant(&self, target: Role) -> bool {
        self.grantable().contains(&target)
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "coach" => Some(Role::Coach),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Coach => "coach",
            Role::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// 사용자 아이덴티티.
///
/// `password_hash`는 단방향 해시이며 직접 비교하지 않습니다.
/// 동일 평문이라도 재해싱하면 다른 저장값이 됩니다 (솔트).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Identity {
    /// 불투명 식별자 (36자 문자열)
    pub id: String,
    /// 사용자 이름 (고유)
    pub username: String,
    /// 이메일 (고유)
    pub email: String,
    /// 단방향 비밀번호 해시 (PHC 문자열)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 역할
    pub role: Role,
}

impl Identity {
    /// 이 아이덴티티가 부여할 수 있는 역할 집합.
    pub fn grantable_roles(&self) -> &'static [Role] {
        self.role.grantable()
    }

    /// `target_role`의 아이덴티티를 새로 만들 수 있는지 확인합니다.
    pub fn can_create(&self, target_role: Role) -> bool {
        self.role.can_grant(target_role)
    }

    /// `target` 아이덴티티를 삭제할 수 있는지 확인합니다.
    ///
    /// 자신이 부여할 수 없는 역할의 아이덴티티는 삭제할 수 없습니다.
    /// 코치가 관리자를 삭제하는 것도 이 규칙으로 차단됩니다.
    pub fn can_delete(&self, target: &Identity) -> bool {
        self.role.can_grant(target.role)
    }

    /// `target` 아이덴티티를 수정할 수 있는지 확인합니다.
    ///
    /// 허용 경로는 세 가지뿐입니다:
    /// 1. 자기 자신 수정 (역할 외 필드)
    /// 2. 엄격한 역할 지배
    /// 3. 코치 동급 수정 - 명명된 정책 예외 ([`coach_peer_modification`])
    ///
    /// 동급(같은 역할, 다른 아이덴티티)은 기본적으로 서로 수정할 수 없습니다.
    pub fn can_modify(&self, target: &Identity) -> bool {
        if self.id == target.id {
            return true;
        }
        if self.role.dominates(target.role) {
            return true;
        }
        coach_peer_modification(self, target)
    }
}

/// 코치 동급 수정 정책.
///
/// 코치가 다른 코치를 수정하는 것은 지배 규칙의 귀결이 아니라 명시적
/// 정책 예외입니다. 다른 동급 쌍(user-user, admin-admin의 타인)으로
/// 일반화하면 안 되므로 별도 함수로 명명합니다.
pub fn coach_peer_modification(actor: &Identity, target: &Identity) -> bool {
    actor.role == Role::Coach && target.role == Role::Coach
}

/// 역할 변경 검증.
///
/// `new_role != target.role`일 때 행위자는 이전 역할과 요청 역할을 모두
/// 부여할 수 있어야 합니다. 역할이 그대로면 계층 검사를 아예 생략합니다.
pub fn authorize_role_change(
    actor: &Identity,
    target: &Identity,
    new_role: Role,
) -> BatResult<()> {
    if new_role == target.role {
        return Ok(());
    }

    if !actor.role.can_grant(new_role) {
        return Err(BatError::Unauthorized(format!(
            "cannot assign the '{}' role",
            new_role
        )));
    }
    if !actor.role.can_grant(target.role) {
        return Err(BatError::Unauthorized(format!(
            "cannot change the role of a '{}' identity",
            target.role
        )));
    }

    Ok(())
}

/// 아이덴티티 업데이트 전체 검증.
///
/// 수정 권한과 역할 변경 규칙을 한 번에 판정하는 업데이트 서비스의
/// 단일 게이트입니다.
pub fn authorize_update(actor: &Identity, target: &Identity, new_role: Role) -> BatResult<()> {
    if !actor.can_modify(target) {
        return Err(BatError::Unauthorized(
            "cannot modify this identity".to_string(),
        ));
    }
    authorize_role_change(actor, target, new_role)
}

/// 사용자 디렉터리(대시보드 목록) 열람 권한.
pub fn can_view_directory(actor: &Identity) -> bool {
    matches!(actor.role, Role::Admin | Role::Coach)
}

/// 평가 리소스 생성/삭제 권한.
pub fn can_manage_assessments(actor: &Identity) -> bool {
    matches!(actor.role, Role::Admin | Role::Coach)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            id: id.to_string(),
            username: format!("user-{}", id),
            email: format!("{}@example.com", id),
            password_hash: "$argon2id$stub".to_string(),
            role,
        }
    }

    #[test]
    fn test_dominance_chain() {
        assert!(Role::Admin.dominates(Role::Coach));
        assert!(Role::Admin.dominates(Role::User));
        assert!(Role::Coach.dominates(Role::User));

        assert!(!Role::Coach.dominates(Role::Admin));
        assert!(!Role::User.dominates(Role::Coach));
        assert!(!Role::Admin.dominates(Role::Admin));
    }

    #[test]
    fn test_grantable_sets() {
        assert_eq!(
            Role::Admin.grantable(),
            &[Role::Admin, Role::Coach, Role::User]
        );
        assert_eq!(Role::Coach.grantable(), &[Role::Coach, Role::User]);
        assert!(Role::User.grantable().is_empty());
    }

    #[test]
    fn test_can_create_matrix() {
        let admin = identity("a1", Role::Admin);
        let coach = identity("c1", Role::Coach);
        let user = identity("u1", Role::User);

        assert!(admin.can_create(Role::Admin));
        assert!(admin.can_create(Role::Coach));
        assert!(admin.can_create(Role::User));

        assert!(!coach.can_create(Role::Admin));
        assert!(coach.can_create(Role::Coach));
        assert!(coach.can_create(Role::User));

        assert!(!user.can_create(Role::User));
        assert!(!user.can_create(Role::Coach));
    }

    #[test]
    fn test_can_delete_blocks_coach_on_admin() {
        let admin = identity("a1", Role::Admin);
        let coach = identity("c1", Role::Coach);
        let other_coach = identity("c2", Role::Coach);
        let user = identity("u1", Role::User);

        assert!(admin.can_delete(&coach));
        assert!(admin.can_delete(&user));
        assert!(coach.can_delete(&other_coach));
        assert!(coach.can_delete(&user));

        assert!(!coach.can_delete(&admin));
        assert!(!user.can_delete(&user));
    }

    #[test]
    fn test_can_modify_self_always() {
        let user = identity("u1", Role::User);
        let coach = identity("c1", Role::Coach);
        let admin = identity("a1", Role::Admin);

        assert!(user.can_modify(&user));
        assert!(coach.can_modify(&coach));
        assert!(admin.can_modify(&admin));
    }

    #[test]
    fn test_can_modify_dominance() {
        let admin = identity("a1", Role::Admin);
        let coach = identity("c1", Role::Coach);
        let user = identity("u1", Role::User);

        assert!(admin.can_modify(&coach));
        assert!(admin.can_modify(&user));
        assert!(coach.can_modify(&user));

        assert!(!coach.can_modify(&admin));
        assert!(!user.can_modify(&coach));
    }

    #[test]
    fn test_peer_modification_only_for_coaches() {
        let coach1 = identity("c1", Role::Coach);
        let coach2 = identity("c2", Role::Coach);
        let user1 = identity("u1", Role::User);
        let user2 = identity("u2", Role::User);

        // 코치 동급 수정은 명명된 예외로 허용
        assert!(coach1.can_modify(&coach2));
        assert!(coach2.can_modify(&coach1));

        // 다른 동급 쌍으로는 일반화되지 않음
        assert!(!user1.can_modify(&user2));
    }

    #[test]
    fn test_role_change_requires_both_roles_grantable() {
        let coach = identity("c1", Role::Coach);
        let target_coach = identity("c2", Role::Coach);
        let admin_target = identity("a1", Role::Admin);

        // coach → admin 승격은 거부
        assert!(authorize_role_change(&coach, &target_coach, Role::Admin).is_err());
        // admin인 대상의 역할 변경도 거부 (이전 역할을 부여할 수 없음)
        assert!(authorize_role_change(&coach, &admin_target, Role::User).is_err());
        // coach → user 강등은 허용
        assert!(authorize_role_change(&coach, &target_coach, Role::User).is_ok());
    }

    #[test]
    fn test_unchanged_role_skips_hierarchy_check() {
        let coach = identity("c1", Role::Coach);
        let admin_target = identity("a1", Role::Admin);

        // 역할이 그대로면 계층 검사를 생략 - admin 대상이어도 통과
        assert!(authorize_role_change(&coach, &admin_target, Role::Admin).is_ok());
    }

    #[test]
    fn test_self_elevation_is_impossible() {
        let coach = identity("c1", Role::Coach);
        let user = identity("u1", Role::User);

        let err = authorize_update(&coach, &coach, Role::Admin).unwrap_err();
        assert!(matches!(err, BatError::Unauthorized(_)));

        let err = authorize_update(&user, &user, Role::Coach).unwrap_err();
        assert!(matches!(err, BatError::Unauthorized(_)));
    }

    #[test]
    fn test_authorize_update_denies_before_role_check() {
        let user = identity("u1", Role::User);
        let other = identity("u2", Role::User);

        // 수정 권한 자체가 없으면 역할 검사 전에 거부
        let err = authorize_update(&user, &other, Role::User).unwrap_err();
        assert!(err.is_denial());
    }

    #[test]
    fn test_directory_and_assessment_gates() {
        let admin = identity("a1", Role::Admin);
        let coach = identity("c1", Role::Coach);
        let user = identity("u1", Role::User);

        assert!(can_view_directory(&admin));
        assert!(can_view_directory(&coach));
        assert!(!can_view_directory(&user));

        assert!(can_manage_assessments(&admin));
        assert!(can_manage_assessments(&coach));
        assert!(!can_manage_assessments(&user));
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("COACH"), Some(Role::Coach));
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("superuser"), None);

        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Coach.to_string(), "coach");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Coach).unwrap();
        assert_eq!(json, "\"coach\"");

        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }

    #[test]
    fn test_identity_serialization_hides_hash() {
        let id = identity("u1", Role::User);
        let json = serde_json::to_string(&id).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
