//! Identity Repository
//!
//! 아이덴티티 테이블 관련 데이터베이스 연산을 담당합니다.
//! 역할 상태는 항상 저장소에서 다시 읽습니다 - 요청 간 캐시가 없습니다.

use sqlx::PgPool;

use bat_core::{BatError, BatResult, Identity};

/// Identity Repository
pub struct IdentityRepository;

impl IdentityRepository {
    /// ID로 아이덴티티 조회.
    pub async fn get(pool: &PgPool, id: &str) -> BatResult<Identity> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        identity.ok_or_else(|| BatError::RecordNotFound(format!("identity {}", id)))
    }

    /// 사용자 이름으로 아이덴티티 조회 (로그인 경로).
    pub async fn get_by_username(pool: &PgPool, username: &str) -> BatResult<Identity> {
        let identity = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM identities
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        identity.ok_or_else(|| BatError::RecordNotFound(format!("identity '{}'", username)))
    }

    /// 모든 아이덴티티 조회 (대시보드 디렉터리).
    pub async fn list_all(pool: &PgPool) -> BatResult<Vec<Identity>> {
        let identities = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email, password_hash, role
            FROM identities
            ORDER BY username
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(identities)
    }

    /// 아이덴티티 수.
    pub async fn count(pool: &PgPool) -> BatResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM identities")
            .fetch_one(pool)
            .await?;

        Ok(count.0)
    }

    /// 새 아이덴티티 삽입.
    ///
    /// username/email 고유 제약 위반은 `Conflict`로 전달됩니다.
    pub async fn insert(pool: &PgPool, identity: &Identity) -> BatResult<Identity> {
        let created = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO identities (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(&identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BatError::Conflict("username 또는 email이 이미 사용 중입니다".to_string())
            }
            other => other.into(),
        })?;

        Ok(created)
    }

    /// 아이덴티티 갱신 (username, email, password_hash, role).
    ///
    /// 단일 행 원자적 UPDATE 하나로 수행됩니다.
    pub async fn update(pool: &PgPool, identity: &Identity) -> BatResult<Identity> {
        let updated = sqlx::query_as::<_, Identity>(
            r#"
            UPDATE identities
            SET username = $2, email = $3, password_hash = $4, role = $5
            WHERE id = $1
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(&identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.role)
        .fetch_optional(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                BatError::Conflict("username 또는 email이 이미 사용 중입니다".to_string())
            }
            other => other.into(),
        })?;

        updated.ok_or_else(|| BatError::RecordNotFound(format!("identity {}", identity.id)))
    }

    /// 아이덴티티 삭제. 삭제된 레코드를 반환합니다.
    pub async fn delete(pool: &PgPool, id: &str) -> BatResult<Identity> {
        let deleted = sqlx::query_as::<_, Identity>(
            r#"
            DELETE FROM identities
            WHERE id = $1
            RETURNING id, username, email, password_hash, role
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        deleted.ok_or_else(|| BatError::RecordNotFound(format!("identity {}", id)))
    }
}
