use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Assessment, Module, ModuleProgress, UserEntity},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::progress::ProgressSummaryResponse,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_get_handler))
        .route("/module/{id}", get(progress_module_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/progress/",
    description = "Get current user's progress",
    responses(
        (status = 200, description = "Progress found", body = ProgressSummaryResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let mm = state.pool();

    let (total_modules, completed_modules, total_attempts, passed_attempts, average_percentage, me) =
        tokio::try_join!(
            Module::count(mm, user),
            ModuleProgress::count_completed(mm, user.user_id()),
            Assessment::count_by_user(mm, user.user_id()),
            Assessment::count_passed_by_user(mm, user.user_id()),
            Assessment::average_percentage(mm, user.user_id()),
            UserEntity::find_by_id(mm, user, user.user_id()),
        )
        .map_err(|e| WebError::resource_fetch_error(ModuleProgress::get_resource_type(), e))?;

    let me = me.ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let res = ProgressSummaryResponse::new(
        total_modules,
        completed_modules,
        total_attempts,
        passed_attempts,
        average_percentage,
        me.username().to_string(),
    );

    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    get,
    path = "/api/v1/progress/module/{id}",
    description = "Get current user's progress record for a module",
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Progress found", body = ModuleProgress),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module not completed yet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_module_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let progress = ModuleProgress::find_for(state.pool(), user.user_id(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(ModuleProgress::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(ModuleProgress::get_resource_type()))?;

    Ok((StatusCode::OK, Json(progress)))
}
