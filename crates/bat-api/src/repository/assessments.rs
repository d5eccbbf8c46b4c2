//! Assessment Repository
//!
//! 평가 리소스와 협업자 부여(grant) 테이블 연산을 담당합니다.
//!
//! 부여 고유성은 저장소의 `(resource_id, identity_id)` 고유 제약이
//! 보장합니다. 코어는 잠금을 잡지 않습니다 - 단일 행 원자성과 고유
//! 제약 집행은 저장소 협력자의 책임입니다.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use bat_core::{Assessment, BatError, BatResult, ResourceGrant};

/// Assessment Repository
pub struct AssessmentRepository;

impl AssessmentRepository {
    // ============================================================================================
    // Assessment Operations
    // ============================================================================================

    /// 새 평가 생성.
    pub async fn create(pool: &PgPool, name: &str, owner_id: &str) -> BatResult<Assessment> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            INSERT INTO assessments (id, name, owner_id, last_edit, last_editor)
            VALUES ($1, $2, $3, $4, $3)
            RETURNING id, name, owner_id, last_edit, last_editor
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(assessment)
    }

    /// 평가 조회.
    pub async fn get(pool: &PgPool, id: Uuid) -> BatResult<Assessment> {
        let assessment = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, name, owner_id, last_edit, last_editor
            FROM assessments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        assessment.ok_or_else(|| BatError::RecordNotFound(format!("assessment {}", id)))
    }

    /// 모든 평가 조회 (대시보드).
    pub async fn list_all(pool: &PgPool) -> BatResult<Vec<Assessment>> {
        let assessments = sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, name, owner_id, last_edit, last_editor
            FROM assessments
            ORDER BY last_edit DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(assessments)
    }

    /// 평가 삭제.
    ///
    /// 소유 리소스 삭제는 해당 부여들의 삭제를 연쇄합니다.
    /// 같은 트랜잭션 안에서 부여를 먼저 지웁니다.
    pub async fn delete(pool: &PgPool, id: Uuid) -> BatResult<()> {
        let mut tx = pool.begin().await.map_err(BatError::from)?;

        sqlx::query("DELETE FROM assessment_grants WHERE resource_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM assessments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // 커밋 없이 반환하면 트랜잭션은 롤백된다
            return Err(BatError::RecordNotFound(format!("assessment {}", id)));
        }

        tx.commit().await.map_err(BatError::from)?;
        Ok(())
    }

    // ============================================================================================
    // Grant (Collaborator) Operations
    // ============================================================================================

    /// 협업자 부여 삽입.
    ///
    /// `(resource_id, identity_id)` 쌍이 이미 존재하면 `false`를
    /// 반환합니다. 호출자는 `false`를 성공이 아니라 "이미 부여됨"으로
    /// 취급해야 합니다.
    pub async fn grant(
        pool: &PgPool,
        resource_id: Uuid,
        identity_id: &str,
        granted_by: &str,
    ) -> BatResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO assessment_grants (resource_id, identity_id, granted_at, granted_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (resource_id, identity_id) DO NOTHING
            "#,
        )
        .bind(resource_id)
        .bind(identity_id)
        .bind(Utc::now())
        .bind(granted_by)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 협업자 부여 철회.
    ///
    /// 부여가 존재해서 제거되었으면 `true`, 없었으면 `false`
    /// (멱등 no-op)입니다.
    pub async fn revoke(pool: &PgPool, resource_id: Uuid, identity_id: &str) -> BatResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM assessment_grants
            WHERE resource_id = $1 AND identity_id = $2
            "#,
        )
        .bind(resource_id)
        .bind(identity_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 접근 가능 여부.
    ///
    /// 소유자이거나 활성 부여가 있으면 true입니다. 역할 지배와 무관하게
    /// 판정합니다 - 역할 기반 대시보드 접근은 권한 엔진이 별도로
    /// 평가합니다.
    pub async fn has_access(
        pool: &PgPool,
        resource_id: Uuid,
        identity_id: &str,
        owner_id: &str,
    ) -> BatResult<bool> {
        if bat_core::is_owner(identity_id, owner_id) {
            return Ok(true);
        }

        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM assessment_grants
                WHERE resource_id = $1 AND identity_id = $2
            )
            "#,
        )
        .bind(resource_id)
        .bind(identity_id)
        .fetch_one(pool)
        .await?;

        Ok(exists.0)
    }

    /// 리소스의 부여 목록 조회.
    pub async fn list_grants(pool: &PgPool, resource_id: Uuid) -> BatResult<Vec<ResourceGrant>> {
        let grants = sqlx::query_as::<_, ResourceGrant>(
            r#"
            SELECT resource_id, identity_id, granted_at, granted_by
            FROM assessment_grants
            WHERE resource_id = $1
            ORDER BY granted_at
            "#,
        )
        .bind(resource_id)
        .fetch_all(pool)
        .await?;

        Ok(grants)
    }
}
