//! 평가 리소스 API 라우트
//!
//! 평가 CRUD와 협업자 부여 오버레이를 제공합니다. 소유권/부여 기반
//! 접근과 역할 기반 대시보드 접근은 서로 독립적으로 판정됩니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/assessments` - 대시보드 목록 (admin/coach)
//! - `POST /api/v1/assessments` - 평가 생성 (admin/coach)
//! - `GET /api/v1/assessments/{id}` - 평가 조회 (소유자 또는 협업자)
//! - `DELETE /api/v1/assessments/{id}` - 평가 삭제 (부여 연쇄 삭제)
//! - `GET /api/v1/assessments/{id}/collaborators` - 부여 목록
//! - `POST /api/v1/assessments/{id}/collaborators` - 협업자 부여
//! - `DELETE /api/v1/assessments/{id}/collaborators/{identity_id}` - 부여 철회

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;

use bat_core::{can_manage_assessments, Assessment, BatError, Identity, ResourceGrant, Role};

use crate::auth::CurrentIdentity;
use crate::error::{error_response, ApiResult};
use crate::repository::{AssessmentRepository, IdentityRepository};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 평가 생성 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssessmentCreate {
    /// 평가 이름
    pub name: String,
}

/// 평가 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssessmentListResponse {
    /// 평가 목록
    pub assessments: Vec<Assessment>,
    /// 총 개수
    pub total: usize,
}

/// 협업자 부여 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantRequest {
    /// 접근을 부여할 아이덴티티
    pub identity_id: String,
}

/// 협업자 부여 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantResponse {
    /// 새로 부여되었으면 true, 이미 부여되어 있었으면 false
    pub granted: bool,
}

/// 부여 철회 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeResponse {
    /// 부여가 존재해서 제거되었으면 true
    pub revoked: bool,
}

/// 협업자 목록 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct CollaboratorListResponse {
    /// 부여 목록
    pub grants: Vec<ResourceGrant>,
    /// 총 개수
    pub total: usize,
}

/// 부여 관리 권한.
///
/// 협업자 부여/철회는 리소스 소유자 또는 관리자만 할 수 있습니다.
fn can_administer_grants(actor: &Identity, assessment: &Assessment) -> bool {
    actor.id == assessment.owner_id || actor.role == Role::Admin
}

// ================================================================================================
// Assessment Handlers
// ================================================================================================

/// GET /api/v1/assessments - 대시보드 목록
async fn list_assessments(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
) -> ApiResult<Json<AssessmentListResponse>> {
    if !can_manage_assessments(&actor) {
        return Err(error_response(BatError::Unauthorized(
            "cannot list assessments".to_string(),
        )));
    }

    let pool = state.pool().map_err(error_response)?;
    let assessments = AssessmentRepository::list_all(pool)
        .await
        .map_err(error_response)?;

    let total = assessments.len();
    Ok(Json(AssessmentListResponse { assessments, total }))
}

/// POST /api/v1/assessments - 평가 생성
async fn create_assessment(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Json(input): Json<AssessmentCreate>,
) -> ApiResult<(StatusCode, Json<Assessment>)> {
    if !can_manage_assessments(&actor) {
        return Err(error_response(BatError::Unauthorized(
            "cannot create assessments".to_string(),
        )));
    }

    let pool = state.pool().map_err(error_response)?;
    let created = AssessmentRepository::create(pool, &input.name, &actor.id)
        .await
        .map_err(error_response)?;

    info!(id = %created.id, owner = %actor.id, "assessment created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/assessments/{id} - 평가 조회
///
/// 소유자이거나 활성 부여가 있는 아이덴티티만 볼 수 있습니다.
/// 이 판정은 역할과 무관합니다.
async fn get_assessment(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Assessment>> {
    let pool = state.pool().map_err(error_response)?;
    let assessment = AssessmentRepository::get(pool, id)
        .await
        .map_err(error_response)?;

    let allowed = AssessmentRepository::has_access(pool, id, &actor.id, &assessment.owner_id)
        .await
        .map_err(error_response)?;
    if !allowed {
        return Err(error_response(BatError::Unauthorized(
            "no access to this assessment".to_string(),
        )));
    }

    Ok(Json(assessment))
}

/// DELETE /api/v1/assessments/{id} - 평가 삭제
///
/// 소유 리소스 삭제는 협업자 부여들의 삭제를 연쇄합니다.
async fn delete_assessment(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !can_manage_assessments(&actor) {
        return Err(error_response(BatError::Unauthorized(
            "cannot delete assessments".to_string(),
        )));
    }

    let pool = state.pool().map_err(error_response)?;
    AssessmentRepository::delete(pool, id)
        .await
        .map_err(error_response)?;

    info!(id = %id, actor = %actor.id, "assessment deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ================================================================================================
// Collaborator Handlers
// ================================================================================================

/// GET /api/v1/assessments/{id}/collaborators - 부여 목록
async fn list_collaborators(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CollaboratorListResponse>> {
    let pool = state.pool().map_err(error_response)?;
    let assessment = AssessmentRepository::get(pool, id)
        .await
        .map_err(error_response)?;

    if !can_administer_grants(&actor, &assessment) {
        return Err(error_response(BatError::Unauthorized(
            "cannot view collaborators".to_string(),
        )));
    }

    let grants = AssessmentRepository::list_grants(pool, id)
        .await
        .map_err(error_response)?;

    let total = grants.len();
    Ok(Json(CollaboratorListResponse { grants, total }))
}

/// POST /api/v1/assessments/{id}/collaborators - 협업자 부여
///
/// 중복 부여는 에러가 아니라 `granted: false`입니다. 호출자는 이를
/// "이미 부여됨"으로 취급해야 합니다.
async fn grant_collaborator(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(id): Path<Uuid>,
    Json(input): Json<GrantRequest>,
) -> ApiResult<Json<GrantResponse>> {
    let pool = state.pool().map_err(error_response)?;
    let assessment = AssessmentRepository::get(pool, id)
        .await
        .map_err(error_response)?;

    if !can_administer_grants(&actor, &assessment) {
        return Err(error_response(BatError::Unauthorized(
            "cannot grant access to this assessment".to_string(),
        )));
    }

    // 부여 대상 아이덴티티가 존재해야 한다
    IdentityRepository::get(pool, &input.identity_id)
        .await
        .map_err(error_response)?;

    let granted = AssessmentRepository::grant(pool, id, &input.identity_id, &actor.id)
        .await
        .map_err(error_response)?;

    if granted {
        info!(resource = %id, identity = %input.identity_id, by = %actor.id, "grant created");
    } else {
        debug!(resource = %id, identity = %input.identity_id, "grant already exists");
    }

    Ok(Json(GrantResponse { granted }))
}

/// DELETE /api/v1/assessments/{id}/collaborators/{identity_id} - 부여 철회
async fn revoke_collaborator(
    State(state): State<Arc<AppState>>,
    CurrentIdentity(actor): CurrentIdentity,
    Path((id, identity_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<RevokeResponse>> {
    let pool = state.pool().map_err(error_response)?;
    let assessment = AssessmentRepository::get(pool, id)
        .await
        .map_err(error_response)?;

    if !can_administer_grants(&actor, &assessment) {
        return Err(error_response(BatError::Unauthorized(
            "cannot revoke access to this assessment".to_string(),
        )));
    }

    let revoked = AssessmentRepository::revoke(pool, id, &identity_id)
        .await
        .map_err(error_response)?;

    info!(resource = %id, identity = %identity_id, revoked, "grant revoked");
    Ok(Json(RevokeResponse { revoked }))
}

/// 평가 라우터 생성.
pub fn assessments_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_assessments).post(create_assessment))
        .route("/{id}", get(get_assessment).delete(delete_assessment))
        .route(
            "/{id}/collaborators",
            get(list_collaborators).post(grant_collaborator),
        )
        .route(
            "/{id}/collaborators/{identity_id}",
            delete(revoke_collaborator),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(id: &str, role: Role) -> Identity {
        Identity {
            id: id.to_string(),
            username: format!("user-{}", id),
            email: format!("{}@example.com", id),
            password_hash: "$argon2id$stub".to_string(),
            role,
        }
    }

    fn assessment(owner: &str) -> Assessment {
        Assessment {
            id: Uuid::new_v4(),
            name: "baseline".to_string(),
            owner_id: owner.to_string(),
            last_edit: Utc::now(),
            last_editor: owner.to_string(),
        }
    }

    #[test]
    fn test_grant_administration_owner_or_admin() {
        let owner = identity("owner-1", Role::Coach);
        let admin = identity("admin-1", Role::Admin);
        let other_coach = identity("coach-2", Role::Coach);
        let user = identity("user-1", Role::User);

        let resource = assessment("owner-1");

        assert!(can_administer_grants(&owner, &resource));
        assert!(can_administer_grants(&admin, &resource));

        // 소유자도 관리자도 아니면 역할과 무관하게 불가
        assert!(!can_administer_grants(&other_coach, &resource));
        assert!(!can_administer_grants(&user, &resource));
    }
}
