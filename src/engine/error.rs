use thiserror::Error;

use crate::model::DatabaseError;

pub type AssessmentResult<T> = std::result::Result<T, AssessmentError>;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("user not found")]
    UserNotFound,
    #[error("module not found")]
    ModuleNotFound,
    #[error("assessment not found")]
    AttemptNotFound,
    #[error("module is locked, complete previous modules first")]
    ModuleLocked,
    #[error("maximum attempts ({max}) reached")]
    LimitExceeded { max: i32 },
    #[error("assessment already submitted")]
    AlreadySubmitted,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for AssessmentError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DatabaseError::SqlxError(e))
    }
}
