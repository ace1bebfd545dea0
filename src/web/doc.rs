use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_list_handler,
        crate::web::routes::user::user_update_handler,
        crate::web::routes::user::user_delete_handler,
        crate::web::routes::assessments::assessment_start_handler,
        crate::web::routes::assessments::assessment_submit_handler,
        crate::web::routes::assessments::assessment_history_handler,
        crate::web::routes::assessments::assessment_questions_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_create_handler,
        crate::web::routes::courses::courses_delete_handler,
        crate::web::routes::courses::courses_modules_handler,
        crate::web::routes::modules::modules_list_handler,
        crate::web::routes::modules::modules_create_handler,
        crate::web::routes::modules::modules_get_handler,
        crate::web::routes::modules::modules_update_handler,
        crate::web::routes::modules::modules_delete_handler,
        crate::web::routes::questions::questions_by_module_handler,
        crate::web::routes::questions::questions_create_handler,
        crate::web::routes::questions::questions_update_handler,
        crate::web::routes::questions::questions_delete_handler,
        crate::web::routes::progress::progress_get_handler,
        crate::web::routes::progress::progress_module_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;
