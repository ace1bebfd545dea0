use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Answer {
    id: Uuid,
    question_id: Uuid,
    answer_text: String,
    is_correct: bool,
    order_index: i32,
}

impl ResourceTyped for Answer {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Answer
    }
}

impl Answer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AnswerCreate {
    pub question_id: Uuid,
    pub answer_text: String,
    pub is_correct: Option<bool>,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Answer, AnswerCreate, Uuid> for Answer {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AnswerCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            INSERT INTO answers (id, question_id, answer_text, is_correct, order_index)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.question_id)
        .bind(&data.answer_text)
        .bind(data.is_correct.unwrap_or(false))
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: AnswerCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE answers
            SET question_id = $1, answer_text = $2, is_correct = $3, order_index = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.question_id)
        .bind(&data.answer_text)
        .bind(data.is_correct.unwrap_or(self.is_correct))
        .bind(data.order_index.unwrap_or(self.order_index))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM answers WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM answers WHERE id = $1")
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
            "SELECT * FROM answers ORDER BY question_id, order_index, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}
