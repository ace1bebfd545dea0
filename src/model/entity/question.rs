use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    module_id: Uuid,
    question_text: String,
    points: i32,
    order_index: i32,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Question
    }
}

impl Question {
    /// Upper bound on a single question's weight. Keeps a module's point total
    /// well inside `i32`.
    pub const MAX_POINTS: i32 = 1000;

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn question_text(&self) -> &str {
        &self.question_text
    }

    pub fn points(&self) -> i32 {
        self.points
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionCreate {
    pub module_id: Uuid,
    pub question_text: String,
    pub points: Option<i32>,
    pub order_index: Option<i32>,
    /// Options inserted together with the question, in the given order.
    #[serde(default)]
    pub answers: Vec<QuestionAnswerCreate>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuestionAnswerCreate {
    pub answer_text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[async_trait]
impl CrudRepository<Question, QuestionCreate, Uuid> for Question {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let mut tx = mm.begin().await?;

        let question: Question = sqlx::query_as(
            r#"
            INSERT INTO questions (id, module_id, question_text, points, order_index)
            VALUES ($1,$2,$3,$4,$5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(&data.question_text)
        .bind(data.points.unwrap_or(1))
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        for (idx, answer) in data.answers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO answers (id, question_id, answer_text, is_correct, order_index)
                VALUES ($1,$2,$3,$4,$5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(question.id)
            .bind(&answer.answer_text)
            .bind(answer.is_correct)
            .bind(idx as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(question)
    }

    /// Updates the question itself; its answer options are managed separately.
    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuestionCreate,
    ) -> DatabaseResult<Self> {
        let row = sqlx::query_as(
            r#"
            UPDATE questions
            SET module_id = $1, question_text = $2, points = $3, order_index = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(data.module_id)
        .bind(&data.question_text)
        .bind(data.points.unwrap_or(self.points))
        .bind(data.order_index.unwrap_or(self.order_index))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(row)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM questions WHERE id = $1")
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
            "SELECT * FROM questions ORDER BY module_id, order_index, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

// Utils

/// A question with its options aggregated into a JSON array.
#[derive(Debug, sqlx::FromRow)]
pub struct QuestionWithAnswersRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    pub answers: serde_json::Value,
}

impl QuestionWithAnswersRow {
    const SELECT: &'static str = r#"
        SELECT
            q.id,
            q.module_id,
            q.question_text,
            q.points,
            q.order_index,
            COALESCE(
                json_agg(
                    json_build_object(
                        'id', a.id,
                        'answer_text', a.answer_text,
                        'is_correct', a.is_correct,
                        'order_index', a.order_index
                    )
                    ORDER BY a.order_index, a.id
                ) FILTER (WHERE a.id IS NOT NULL),
                '[]'
            ) AS answers
        FROM questions q
        LEFT JOIN answers a ON a.question_id = q.id
    "#;

    pub async fn fetch_by_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let query = format!(
            "{} WHERE q.module_id = $1 GROUP BY q.id ORDER BY q.order_index, q.id",
            Self::SELECT
        );
        let rows = sqlx::query_as(&query)
            .bind(module_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(rows)
    }

    pub async fn find_by_id(mm: &ModelManager, id: Uuid) -> DatabaseResult<Option<Self>> {
        let query = format!("{} WHERE q.id = $1 GROUP BY q.id", Self::SELECT);
        let row = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(row)
    }
}

/// One (question, option) pair of a module's answer key. Questions without
/// options come back once with `answer_id = NULL`.
#[derive(Debug, sqlx::FromRow)]
pub struct AnswerKeyRow {
    pub question_id: Uuid,
    pub points: i32,
    pub answer_id: Option<Uuid>,
    pub is_correct: Option<bool>,
}

impl AnswerKeyRow {
    pub async fn fetch_by_module(
        conn: &mut PgConnection,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT
                q.id AS question_id,
                q.points,
                a.id AS answer_id,
                a.is_correct
            FROM questions q
            LEFT JOIN answers a ON a.question_id = q.id
            WHERE q.module_id = $1
            ORDER BY q.order_index, q.id, a.order_index, a.id
            "#,
        )
        .bind(module_id)
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }
}
