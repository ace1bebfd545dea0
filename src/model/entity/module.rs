use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const DEFAULT_PASSING_SCORE: i32 = 70;
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Module {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    order_index: i32,
    /// Minimal percentage required to pass the module assessment.
    passing_score: i32,
    max_attempts: i32,
    is_locked: bool,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ModuleCreate {
    pub course_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub order_index: Option<i32>,
    pub passing_score: Option<i32>,
    pub max_attempts: Option<i32>,
    pub is_locked: Option<bool>,
}

impl ResourceTyped for Module {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Module
    }
}

impl Module {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    pub fn passing_score(&self) -> i32 {
        self.passing_score
    }

    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked
    }
}

#[async_trait]
impl CrudRepository<Module, ModuleCreate, Uuid> for Module {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO modules
                (id, course_id, title, description, order_index, passing_score, max_attempts, is_locked)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index.unwrap_or(0))
        .bind(data.passing_score.unwrap_or(DEFAULT_PASSING_SCORE))
        .bind(data.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS))
        .bind(data.is_locked.unwrap_or(false))
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: ModuleCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE modules
            SET course_id = $1, title = $2, description = $3, order_index = $4,
                passing_score = $5, max_attempts = $6, is_locked = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.order_index.unwrap_or(self.order_index))
        .bind(data.passing_score.unwrap_or(self.passing_score))
        .bind(data.max_attempts.unwrap_or(self.max_attempts))
        .bind(data.is_locked.unwrap_or(self.is_locked))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM modules ORDER BY course_id, order_index, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM modules")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Module, ModuleCreate, Uuid);

// Transactional helpers used by the assessment engine

impl Module {
    pub async fn find_by_id_in(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM modules WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(result)
    }

    /// Modules of a course in sequence order.
    pub async fn find_all_by_course(
        conn: &mut PgConnection,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT *
            FROM modules m
            WHERE m.course_id = $1
            ORDER BY m.order_index, m.id
            "#,
        )
        .bind(course_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    pub async fn set_locked(
        conn: &mut PgConnection,
        id: Uuid,
        locked: bool,
    ) -> DatabaseResult<()> {
        sqlx::query("UPDATE modules SET is_locked = $1 WHERE id = $2")
            .bind(locked)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

// Utils

#[derive(Debug, sqlx::FromRow)]
pub struct ModuleWithPassRow {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub passing_score: i32,
    pub max_attempts: i32,
    pub is_locked: bool,
    pub passed: bool,
}

impl ModuleWithPassRow {
    /// Course modules in sequence order, each flagged with whether `user_id` has passed it.
    pub async fn fetch_by_course(
        mm: &ModelManager,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                m.id,
                m.course_id,
                m.title,
                m.description,
                m.order_index,
                m.passing_score,
                m.max_attempts,
                m.is_locked,
                EXISTS (
                    SELECT 1 FROM assessments a
                    WHERE a.module_id = m.id AND a.user_id = $1 AND a.passed
                ) AS passed
            FROM modules m
            WHERE m.course_id = $2
            ORDER BY m.order_index, m.id
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }
}
