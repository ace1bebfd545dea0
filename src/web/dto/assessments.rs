use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StartAssessmentRequest {
    pub module_id: Uuid,
    /// Defaults to the caller. Only admins may start attempts for someone else.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitAssessmentRequest {
    /// Chosen answer id per question id. Unanswered questions score nothing.
    #[schema(value_type = HashMap<String, String>)]
    pub answers: HashMap<Uuid, Uuid>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct HistoryQuery {
    pub module_id: Uuid,
    pub user_id: Option<Uuid>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn submission_answers_parse_from_string_keys() {
        let q = Uuid::new_v4();
        let a = Uuid::new_v4();
        let body = serde_json::json!({ "answers": { q.to_string(): a.to_string() } });

        let req: SubmitAssessmentRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.answers.get(&q), Some(&a));
    }

    #[test]
    fn start_request_user_is_optional() {
        let m = Uuid::new_v4();
        let req: StartAssessmentRequest =
            serde_json::from_value(serde_json::json!({ "module_id": m })).unwrap();
        assert_eq!(req.module_id, m);
        assert!(req.user_id.is_none());
    }
}
