use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// One try of a user at a module assessment. Created open (`completed_at` is
/// `None`) and completed exactly once; rows are never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Assessment {
    id: Uuid,
    user_id: Uuid,
    module_id: Uuid,
    attempt_number: i32,
    score: i32,
    total_points: i32,
    percentage: f64,
    passed: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    feedback: Option<String>,
}

impl ResourceTyped for Assessment {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Assessment
    }
}

impl Assessment {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn attempt_number(&self) -> i32 {
        self.attempt_number
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn total_points(&self) -> i32 {
        self.total_points
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Values written on submission.
#[derive(Debug)]
pub struct AssessmentCompletion {
    pub score: i32,
    pub total_points: i32,
    pub percentage: f64,
    pub passed: bool,
    pub feedback: String,
}

impl Assessment {
    pub async fn count_for(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assessments WHERE user_id = $1 AND module_id = $2",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_one(conn)
        .await?;
        Ok(result)
    }

    pub async fn insert_started(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
        attempt_number: i32,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO assessments (id, user_id, module_id, attempt_number, started_at)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(module_id)
        .bind(attempt_number)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    pub async fn find_by_id_in(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(result)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Writes the scores only while the attempt is still open. `None` means
    /// another submission completed it first.
    pub async fn complete(
        conn: &mut PgConnection,
        id: Uuid,
        data: AssessmentCompletion,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            r#"
            UPDATE assessments
            SET score = $1, total_points = $2, percentage = $3, passed = $4,
                feedback = $5, completed_at = $6
            WHERE id = $7 AND completed_at IS NULL
            RETURNING *
            "#,
        )
        .bind(data.score)
        .bind(data.total_points)
        .bind(data.percentage)
        .bind(data.passed)
        .bind(&data.feedback)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row)
    }

    /// Attempts of a user on a module, most recent first.
    pub async fn history(
        mm: &ModelManager,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT *
            FROM assessments a
            WHERE a.user_id = $1 AND a.module_id = $2
            ORDER BY a.attempt_number DESC
            "#,
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(rows)
    }

    pub async fn count_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn count_passed_by_user(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assessments WHERE user_id = $1 AND passed = TRUE",
        )
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    /// Mean percentage over the user's submitted attempts, 0 when there are none.
    pub async fn average_percentage(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<f64> {
        let result: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(AVG(percentage), 0)::DOUBLE PRECISION
            FROM assessments
            WHERE user_id = $1 AND completed_at IS NOT NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}

#[async_trait]
impl HasOwner for Assessment {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}
