use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    engine,
    model::{
        CrudRepository, ResourceTyped,
        entity::{Module, Question, QuestionCreate, QuestionWithAnswersRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::questions::QuestionWithAnswers,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", post(questions_create_handler))
        .route("/module/{id}", get(questions_by_module_handler))
        .route(
            "/{id}",
            put(questions_update_handler).delete(questions_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn validate(payload: &QuestionCreate) -> WebResult<()> {
    let resource = Question::get_resource_type();

    if payload.question_text.trim().is_empty() {
        return Err(WebError::resource_bad_request(
            resource,
            "question_text must not be empty",
        ));
    }
    if payload
        .points
        .is_some_and(|points| !(1..=Question::MAX_POINTS).contains(&points))
    {
        return Err(WebError::resource_bad_request(
            resource,
            format!("points must be within 1..={}", Question::MAX_POINTS),
        ));
    }
    if payload.answers.iter().any(|a| a.answer_text.trim().is_empty()) {
        return Err(WebError::resource_bad_request(
            resource,
            "answer_text must not be empty",
        ));
    }

    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/questions/module/{id}",
    description = "Questions of a module in order, with the answer key",
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Questions found", body = Vec<QuestionWithAnswers>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(
        ("cookie" = [])
    )
)]
async fn questions_by_module_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Question::get_resource_type())?;

    let rows = engine::module_questions(state.pool(), id).await?;
    let questions = QuestionWithAnswers::from_rows(rows)
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(questions)))
}

#[utoipa::path(
    post,
    path = "/api/v1/questions/",
    description = "Creates a question together with its answer options",
    request_body = QuestionCreate,
    responses(
        (status = 200, description = "Question created", body = QuestionWithAnswers),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(
        ("cookie" = [])
    )
)]
async fn questions_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Question::get_resource_type())?;
    validate(&payload)?;

    Module::find_by_id(state.pool(), user, payload.module_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    let created = Question::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    let row = QuestionWithAnswersRow::find_by_id(state.pool(), created.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;
    let question = QuestionWithAnswers::try_from(row).map_err(|e| {
        WebError::resource_fetch_error(Question::get_resource_type(), e.into())
    })?;

    Ok((StatusCode::OK, Json(question)))
}

#[utoipa::path(
    put,
    path = "/api/v1/questions/{id}",
    description = "Updates question text, points and order. Answer options are left untouched",
    request_body = QuestionCreate,
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 400, description = "Invalid question", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(
        ("cookie" = [])
    )
)]
async fn questions_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuestionCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Question::get_resource_type())?;
    validate(&payload)?;

    let found = Question::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;

    if found.module_id() != payload.module_id {
        Module::find_by_id(state.pool(), user, payload.module_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
            .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;
    }

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/questions/{id}",
    description = "Deletes a question with its answer options",
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Question not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "questions",
    security(
        ("cookie" = [])
    )
)]
async fn questions_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Question::get_resource_type())?;

    let found = Question::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Question::get_resource_type()))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::entity::QuestionAnswerCreate;

    fn payload(points: Option<i32>) -> QuestionCreate {
        QuestionCreate {
            module_id: Uuid::new_v4(),
            question_text: String::from("Which rate applies to children's clothing?"),
            points,
            order_index: None,
            answers: vec![QuestionAnswerCreate {
                answer_text: String::from("Zero rate"),
                is_correct: true,
            }],
        }
    }

    #[test]
    fn points_stay_within_bounds() {
        assert!(validate(&payload(None)).is_ok());
        assert!(validate(&payload(Some(1))).is_ok());
        assert!(validate(&payload(Some(Question::MAX_POINTS))).is_ok());

        for points in [0, -5, Question::MAX_POINTS + 1, i32::MAX] {
            let err = validate(&payload(Some(points))).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn blank_texts_are_rejected() {
        let mut p = payload(Some(2));
        p.question_text = String::from("  ");
        assert!(validate(&p).is_err());

        let mut p = payload(Some(2));
        p.answers[0].answer_text = String::new();
        assert!(validate(&p).is_err());
    }
}
