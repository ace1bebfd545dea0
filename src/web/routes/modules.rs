use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped,
        entity::{Course, Module, ModuleCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, WebError, WebResult, error::ErrorResponse,
        middlewares, routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(modules_list_handler).post(modules_create_handler))
        .route(
            "/{id}",
            get(modules_get_handler)
                .put(modules_update_handler)
                .delete(modules_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

fn validate(payload: &ModuleCreate) -> WebResult<()> {
    let resource = Module::get_resource_type();

    if payload.title.trim().is_empty() {
        return Err(WebError::resource_bad_request(resource, "title must not be empty"));
    }
    if payload
        .passing_score
        .is_some_and(|score| !(0..=100).contains(&score))
    {
        return Err(WebError::resource_bad_request(
            resource,
            "passing_score must be within 0..=100",
        ));
    }
    if payload.max_attempts.is_some_and(|max| max < 1) {
        return Err(WebError::resource_bad_request(
            resource,
            "max_attempts must be at least 1",
        ));
    }

    Ok(())
}

async fn ensure_course(state: &AppState, user: &AuthenticatedUser, id: Uuid) -> WebResult<()> {
    Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/",
    description = "Lists modules of every course page by page, in course order",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<Module>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let modules = Module::page(state.pool(), user, page.limit, page.offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(modules)))
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/",
    description = "Creates a module inside a course",
    request_body = ModuleCreate,
    responses(
        (status = 200, description = "Module created", body = Module),
        (status = 400, description = "Invalid module settings", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Module::get_resource_type())?;
    validate(&payload)?;
    ensure_course(&state, user, payload.course_id).await?;

    let created = Module::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    tracing::info!(module_id = %created.id(), course_id = %created.course_id(), "module created");
    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{id}",
    description = "Fetches a single module",
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Module found", body = Module),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    put,
    path = "/api/v1/modules/{id}",
    description = "Updates a module. Omitted optional settings keep their current values",
    request_body = ModuleCreate,
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 400, description = "Invalid module settings", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Module or course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleCreate>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Module::get_resource_type())?;
    validate(&payload)?;

    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    if found.course_id() != payload.course_id {
        ensure_course(&state, user, payload.course_id).await?;
    }

    let updated = found
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{id}",
    description = "Deletes a module with its questions and attempts",
    params(
        ("id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "modules",
    security(
        ("cookie" = [])
    )
)]
async fn modules_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.require_admin(Module::get_resource_type())?;

    let found = Module::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    found
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod test {
    use super::*;

    fn payload() -> ModuleCreate {
        ModuleCreate {
            course_id: Uuid::new_v4(),
            title: String::from("VAT registration"),
            description: String::new(),
            order_index: Some(0),
            passing_score: None,
            max_attempts: None,
            is_locked: None,
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&payload()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let mut p = payload();
        p.passing_score = Some(101);
        assert_eq!(validate(&p).unwrap_err().status_code(), StatusCode::BAD_REQUEST);

        let mut p = payload();
        p.max_attempts = Some(0);
        assert!(validate(&p).is_err());

        let mut p = payload();
        p.title = String::from("   ");
        assert!(validate(&p).is_err());
    }
}
