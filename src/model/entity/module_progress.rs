use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct ModuleProgress {
    id: Uuid,
    user_id: Uuid,
    module_id: Uuid,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    progress: f64,
}

impl ResourceTyped for ModuleProgress {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::ModuleProgress
    }
}

impl ModuleProgress {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }
}

impl ModuleProgress {
    /// Marks (user, module) as complete at 100%, creating the record if needed.
    pub async fn upsert_completed(
        conn: &mut PgConnection,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO module_progress (id, user_id, module_id, completed, completed_at, progress)
            VALUES ($1, $2, $3, TRUE, $4, 100)
            ON CONFLICT (user_id, module_id) DO UPDATE
            SET completed = TRUE, completed_at = EXCLUDED.completed_at, progress = 100
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(module_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;
        Ok(row)
    }

    pub async fn find_for(
        mm: &ModelManager,
        user_id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let row = sqlx::query_as(
            "SELECT * FROM module_progress WHERE user_id = $1 AND module_id = $2",
        )
        .bind(user_id)
        .bind(module_id)
        .fetch_optional(mm.executor())
        .await?;
        Ok(row)
    }

    pub async fn count_completed(mm: &ModelManager, user_id: Uuid) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM module_progress WHERE user_id = $1 AND completed = TRUE",
        )
        .bind(user_id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
