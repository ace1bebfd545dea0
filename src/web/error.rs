use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    engine::AssessmentError,
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}. Details: {details}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        details: String,
    },
}

/// Assessment rule violations. Client-visible, never retried.
#[derive(Debug, Error)]
pub enum AssessmentRuleError {
    #[error("AssessmentModuleLocked")]
    AssessmentModuleLocked,

    #[error("AssessmentAttemptsExhausted, max: {max}")]
    AssessmentAttemptsExhausted { max: i32 },

    #[error("AssessmentAlreadySubmitted")]
    AssessmentAlreadySubmitted,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieInvalid { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationCookieInvalid { .. } => {
                String::from("Authentication error, cookie invalid.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => {
                format!("Resource error, {} not found.", resource_name(resource_type))
            }
            Self::ResourceForbidden { .. } => String::from("Resource error, resource forbidden."),
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to fetch resource.")
            }
            Self::ResourceBadRequest { details, .. } => {
                format!("Resource error, bad request: {details}")
            }
        }
    }
}

impl AssessmentRuleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AssessmentModuleLocked => StatusCode::LOCKED,
            Self::AssessmentAttemptsExhausted { .. } => StatusCode::FORBIDDEN,
            Self::AssessmentAlreadySubmitted => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AssessmentModuleLocked => {
                String::from("Module is locked. Complete previous modules first.")
            }
            Self::AssessmentAttemptsExhausted { max } => {
                format!("Maximum attempts ({max}) reached")
            }
            Self::AssessmentAlreadySubmitted => String::from("Assessment already submitted"),
        }
    }
}

fn resource_name(r#type: &ResourceType) -> &'static str {
    match r#type {
        ResourceType::User => "user",
        ResourceType::Course => "course",
        ResourceType::Module => "module",
        ResourceType::Question => "question",
        ResourceType::Answer => "answer",
        ResourceType::Assessment => "assessment",
        ResourceType::ModuleProgress => "progress",
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("AssessmentRuleError - {0}")]
    AssessmentRuleError(#[from] AssessmentRuleError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            details: details.into(),
        })
    }

    /// Maps ownership checks: `Forbidden` stays client-visible, the rest is a fetch error.
    pub fn from_access(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Forbidden = error {
            Self::resource_forbidden(r#type)
        } else {
            Self::resource_fetch_error(r#type, error)
        }
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::AssessmentRuleError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::AssessmentRuleError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

impl From<AssessmentError> for WebError {
    fn from(e: AssessmentError) -> Self {
        match e {
            AssessmentError::UserNotFound => Self::resource_not_found(ResourceType::User),
            AssessmentError::ModuleNotFound => Self::resource_not_found(ResourceType::Module),
            AssessmentError::AttemptNotFound => Self::resource_not_found(ResourceType::Assessment),
            AssessmentError::ModuleLocked => AssessmentRuleError::AssessmentModuleLocked.into(),
            AssessmentError::LimitExceeded { max } => {
                AssessmentRuleError::AssessmentAttemptsExhausted { max }.into()
            }
            AssessmentError::AlreadySubmitted => {
                AssessmentRuleError::AssessmentAlreadySubmitted.into()
            }
            AssessmentError::Database(e) => {
                Self::resource_fetch_error(ResourceType::Assessment, e)
            }
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn engine_errors_map_to_statuses() {
        let cases = [
            (AssessmentError::UserNotFound, StatusCode::NOT_FOUND),
            (AssessmentError::ModuleNotFound, StatusCode::NOT_FOUND),
            (AssessmentError::AttemptNotFound, StatusCode::NOT_FOUND),
            (AssessmentError::ModuleLocked, StatusCode::LOCKED),
            (AssessmentError::LimitExceeded { max: 3 }, StatusCode::FORBIDDEN),
            (AssessmentError::AlreadySubmitted, StatusCode::CONFLICT),
        ];

        for (err, status) in cases {
            assert_eq!(WebError::from(err).status_code(), status);
        }
    }

    #[test]
    fn rule_messages_name_the_precondition() {
        let locked = WebError::from(AssessmentError::ModuleLocked);
        assert!(locked.client_display().starts_with("Module is locked"));

        let limit = WebError::from(AssessmentError::LimitExceeded { max: 3 });
        assert_eq!(limit.client_display(), "Maximum attempts (3) reached");

        let missing = WebError::from(AssessmentError::AttemptNotFound);
        assert_eq!(missing.client_display(), "Resource error, assessment not found.");
    }

    #[test]
    fn forbidden_access_stays_forbidden() {
        let err = WebError::from_access(ResourceType::Assessment, DatabaseError::Forbidden);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
