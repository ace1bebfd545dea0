use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{DatabaseResult, entity::QuestionWithAnswersRow};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct AnswerOption {
    pub id: Uuid,
    pub answer_text: String,
    pub is_correct: bool,
    pub order_index: i32,
}

/// Option as shown to learners, correctness withheld.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AnswerChoice {
    pub id: Uuid,
    pub answer_text: String,
    pub order_index: i32,
}

impl From<AnswerOption> for AnswerChoice {
    fn from(value: AnswerOption) -> Self {
        Self {
            id: value.id,
            answer_text: value.answer_text,
            order_index: value.order_index,
        }
    }
}

/// Authoring view of a question with its answer key.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QuestionWithAnswers {
    pub id: Uuid,
    pub module_id: Uuid,
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    pub answers: Vec<AnswerOption>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LearnerQuestion {
    pub id: Uuid,
    pub module_id: Uuid,
    pub question_text: String,
    pub points: i32,
    pub order_index: i32,
    pub answers: Vec<AnswerChoice>,
}

impl TryFrom<QuestionWithAnswersRow> for QuestionWithAnswers {
    type Error = serde_json::Error;

    fn try_from(value: QuestionWithAnswersRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            module_id: value.module_id,
            question_text: value.question_text,
            points: value.points,
            order_index: value.order_index,
            answers: serde_json::from_value(value.answers)?,
        })
    }
}

impl From<QuestionWithAnswers> for LearnerQuestion {
    fn from(value: QuestionWithAnswers) -> Self {
        Self {
            id: value.id,
            module_id: value.module_id,
            question_text: value.question_text,
            points: value.points,
            order_index: value.order_index,
            answers: value.answers.into_iter().map(AnswerChoice::from).collect(),
        }
    }
}

impl QuestionWithAnswers {
    pub fn from_rows(rows: Vec<QuestionWithAnswersRow>) -> DatabaseResult<Vec<Self>> {
        Ok(rows
            .into_iter()
            .map(QuestionWithAnswers::try_from)
            .collect::<Result<_, _>>()?)
    }
}

impl LearnerQuestion {
    pub fn from_rows(rows: Vec<QuestionWithAnswersRow>) -> DatabaseResult<Vec<Self>> {
        Ok(QuestionWithAnswers::from_rows(rows)?
            .into_iter()
            .map(LearnerQuestion::from)
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row() -> QuestionWithAnswersRow {
        QuestionWithAnswersRow {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            question_text: String::from("What is the standard VAT rate?"),
            points: 2,
            order_index: 0,
            answers: serde_json::json!([
                { "id": Uuid::new_v4(), "answer_text": "15%", "is_correct": true, "order_index": 0 },
                { "id": Uuid::new_v4(), "answer_text": "20%", "is_correct": false, "order_index": 1 },
            ]),
        }
    }

    #[test]
    fn authoring_view_keeps_answer_key() {
        let questions = QuestionWithAnswers::from_rows(vec![row()]).unwrap();
        assert_eq!(questions[0].answers.len(), 2);
        assert!(questions[0].answers[0].is_correct);
        assert!(!questions[0].answers[1].is_correct);
    }

    #[test]
    fn learner_view_hides_correctness() {
        let questions = LearnerQuestion::from_rows(vec![row()]).unwrap();
        let json = serde_json::to_value(&questions).unwrap();

        let answers = json[0]["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0]["answer_text"], "15%");
        assert!(answers.iter().all(|a| a.get("is_correct").is_none()));
    }

    #[test]
    fn malformed_aggregate_is_an_error() {
        let mut bad = row();
        bad.answers = serde_json::json!([{ "id": "not-a-uuid" }]);
        assert!(QuestionWithAnswers::try_from(bad).is_err());
    }
}
