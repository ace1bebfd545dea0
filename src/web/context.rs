//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{
    model::ResourceType,
    web::{WebResult, error::WebError},
};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    /// Internal actor for bootstrap and CLI work, never tied to a real row.
    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: Uuid::max(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.user_role == UserRole::Admin
    }

    pub fn require_admin(&self, resource: ResourceType) -> WebResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(WebError::resource_forbidden(resource))
        }
    }

    /// Resolves the user an operation targets: the caller by default, anyone
    /// else only for admins.
    pub fn acting_for(&self, requested: Option<Uuid>, resource: ResourceType) -> WebResult<Uuid> {
        match requested {
            None => Ok(self.user_id),
            Some(id) if id == self.user_id => Ok(id),
            Some(id) => {
                self.require_admin(resource)?;
                Ok(id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserRole {
    Admin,
    User,
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn role_parsing() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("user"), UserRole::User);
        assert_eq!(UserRole::from("anything"), UserRole::User);
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }

    #[test]
    fn learner_acts_only_for_self() {
        let me = AuthenticatedUser::new(Uuid::new_v4(), UserRole::User);
        assert_eq!(me.acting_for(None, ResourceType::Assessment).unwrap(), me.user_id());
        assert_eq!(
            me.acting_for(Some(me.user_id()), ResourceType::Assessment).unwrap(),
            me.user_id()
        );
        assert!(me.acting_for(Some(Uuid::new_v4()), ResourceType::Assessment).is_err());
    }

    #[test]
    fn admin_acts_for_anyone() {
        let admin = AuthenticatedUser::new(Uuid::new_v4(), UserRole::Admin);
        let other = Uuid::new_v4();
        assert_eq!(
            admin.acting_for(Some(other), ResourceType::Assessment).unwrap(),
            other
        );
    }

    #[test]
    fn missing_user_requires_auth() {
        let ctx = RequestContext::new(None);
        assert_eq!(
            ctx.user().unwrap_err().status_code(),
            axum::http::StatusCode::UNAUTHORIZED
        );
    }
}
