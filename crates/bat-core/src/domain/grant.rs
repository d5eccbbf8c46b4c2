//! 리소스 접근 부여(grant) 모델.
//!
//! 평가(assessment) 같은 리소스에 대해 소유자가 아닌 아이덴티티에게
//! 명시적으로 부여하는 협업자 접근 레코드입니다. 부여는 역할 지배와
//! 무관하게 동작합니다 - 역할 기반 대시보드 접근은 권한 엔진이 별도로
//! 판정합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 리소스 접근 부여 레코드.
///
/// `(resource_id, identity_id)` 쌍당 최대 하나만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct ResourceGrant {
    /// 대상 리소스
    pub resource_id: Uuid,
    /// 접근을 부여받은 아이덴티티
    pub identity_id: String,
    /// 부여 시각
    pub granted_at: DateTime<Utc>,
    /// 부여한 아이덴티티
    pub granted_by: String,
}

impl ResourceGrant {
    /// 이 부여가 해당 (리소스, 아이덴티티) 쌍을 커버하는지 확인합니다.
    pub fn covers(&self, resource_id: Uuid, identity_id: &str) -> bool {
        self.resource_id == resource_id && self.identity_id == identity_id
    }
}

/// 평가 리소스.
///
/// 접근 제어 판정에 필요한 필드만 유지합니다. 질문/답변 본문은
/// 외부 협력자 소관입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Assessment {
    /// 리소스 식별자
    pub id: Uuid,
    /// 평가 이름
    pub name: String,
    /// 소유자 아이덴티티
    pub owner_id: String,
    /// 마지막 수정 시각
    pub last_edit: DateTime<Utc>,
    /// 마지막 수정자
    pub last_editor: String,
}

/// 소유권 또는 부여 기반 접근 판정 (순수 부분).
///
/// 저장소 조회 없이 판정 가능한 소유자 경로입니다. 부여 존재 여부는
/// 저장소 계층이 확인합니다.
pub fn is_owner(identity_id: &str, owner_id: &str) -> bool {
    identity_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_covers_exact_pair() {
        let resource = Uuid::new_v4();
        let grant = ResourceGrant {
            resource_id: resource,
            identity_id: "id-1".to_string(),
            granted_at: Utc::now(),
            granted_by: "owner-1".to_string(),
        };

        assert!(grant.covers(resource, "id-1"));
        assert!(!grant.covers(resource, "id-2"));
        assert!(!grant.covers(Uuid::new_v4(), "id-1"));
    }

    #[test]
    fn test_is_owner() {
        assert!(is_owner("abc", "abc"));
        assert!(!is_owner("abc", "def"));
    }
}
