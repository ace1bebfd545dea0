use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    engine::{self, SubmissionResult},
    model::{
        ResourceTyped, check_access,
        entity::{Assessment, Question},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            assessments::{HistoryQuery, StartAssessmentRequest, SubmitAssessmentRequest},
            questions::LearnerQuestion,
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/start", post(assessment_start_handler))
        .route("/{id}/submit", post(assessment_submit_handler))
        .route("/history", get(assessment_history_handler))
        .route("/module/{id}/questions", get(assessment_questions_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/assessments/start",
    description = "Starts a new attempt on a module assessment",
    request_body = StartAssessmentRequest,
    responses(
        (status = 200, description = "Attempt started", body = Assessment),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Maximum attempts reached, or starting for another user without being an admin", body = ErrorResponse),
        (status = 404, description = "User or module not found", body = ErrorResponse),
        (status = 423, description = "Module is locked", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "assessments",
    security(
        ("cookie" = [])
    )
)]
async fn assessment_start_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<StartAssessmentRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let user_id = user.acting_for(payload.user_id, Assessment::get_resource_type())?;

    let assessment = engine::start_assessment(state.pool(), user_id, payload.module_id).await?;

    Ok((StatusCode::OK, Json(assessment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/assessments/{id}/submit",
    description = "Scores the answers of an open attempt. Passing completes the module and unlocks the next one",
    request_body = SubmitAssessmentRequest,
    params(
        ("id" = Uuid, Path, description = "Assessment (attempt) id")
    ),
    responses(
        (status = 200, description = "Attempt scored", body = SubmissionResult),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Attempt belongs to another user", body = ErrorResponse),
        (status = 404, description = "Attempt not found", body = ErrorResponse),
        (status = 409, description = "Attempt already submitted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "assessments",
    security(
        ("cookie" = [])
    )
)]
async fn assessment_submit_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAssessmentRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = Assessment::find_by_id(state.pool(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Assessment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Assessment::get_resource_type()))?;

    check_access(state.pool(), user, &found, user.user_id())
        .await
        .map_err(|e| WebError::from_access(Assessment::get_resource_type(), e))?;

    let result = engine::submit_assessment(state.pool(), found.id(), &payload.answers).await?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assessments/history",
    description = "Attempts of a user on a module, most recent first",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Attempts found", body = Vec<Assessment>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "Reading another user's history without being an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "assessments",
    security(
        ("cookie" = [])
    )
)]
async fn assessment_history_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let user_id = user.acting_for(query.user_id, Assessment::get_resource_type())?;

    let history = engine::assessment_history(state.pool(), user_id, query.module_id).await?;

    Ok((StatusCode::OK, Json(history)))
}

#[utoipa::path(
    get,
    path = "/api/v1/assessments/module/{id}/questions",
    description = "Questions of a module in order, without the answer key",
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Questions found", body = Vec<LearnerQuestion>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "assessments",
    security(
        ("cookie" = [])
    )
)]
async fn assessment_questions_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    ctx.user()?;

    let rows = engine::module_questions(state.pool(), id).await?;
    let questions = LearnerQuestion::from_rows(rows)
        .map_err(|e| WebError::resource_fetch_error(Question::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(questions)))
}
