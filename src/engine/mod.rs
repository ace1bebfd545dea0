//! Assessment engine: starting attempts, scoring submissions, completing
//! progress and unlocking the next module of a course.
//!
//! Every mutating operation runs in a single transaction. `start_assessment`
//! row-locks the user so concurrent starts of the same user are serialized;
//! `submit_assessment` completes the attempt with a compare-and-set update so
//! only one submission of an attempt can win.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::model::{
    ModelManager,
    entity::{
        AnswerKeyRow, Assessment, AssessmentCompletion, Module, ModuleProgress,
        QuestionWithAnswersRow, UserEntity,
    },
};

mod error;
pub use error::{AssessmentError, AssessmentResult};

pub mod scoring;
use scoring::QuestionKey;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmissionResult {
    pub assessment: Assessment,
    /// Correctness per question id.
    #[schema(value_type = HashMap<String, bool>)]
    pub results: HashMap<Uuid, bool>,
    pub passed: bool,
    pub percentage: f64,
    /// `"<earned>/<total>"`
    pub score: String,
}

#[tracing::instrument(skip(mm))]
pub async fn start_assessment(
    mm: &ModelManager,
    user_id: Uuid,
    module_id: Uuid,
) -> AssessmentResult<Assessment> {
    let mut tx = mm.begin().await?;

    UserEntity::lock_for_update(&mut tx, user_id)
        .await?
        .ok_or(AssessmentError::UserNotFound)?;

    let module = Module::find_by_id_in(&mut tx, module_id)
        .await?
        .ok_or(AssessmentError::ModuleNotFound)?;

    let prior = Assessment::count_for(&mut tx, user_id, module_id).await?;
    let attempt_number =
        scoring::next_attempt_number(module.is_locked(), module.max_attempts(), prior)?;

    let assessment = Assessment::insert_started(&mut tx, user_id, module_id, attempt_number).await?;
    tx.commit().await?;

    tracing::info!(
        assessment_id = %assessment.id(),
        attempt_number,
        "assessment started"
    );
    Ok(assessment)
}

#[tracing::instrument(skip(mm, answers))]
pub async fn submit_assessment(
    mm: &ModelManager,
    attempt_id: Uuid,
    answers: &HashMap<Uuid, Uuid>,
) -> AssessmentResult<SubmissionResult> {
    let mut tx = mm.begin().await?;

    let attempt = Assessment::find_by_id_in(&mut tx, attempt_id)
        .await?
        .ok_or(AssessmentError::AttemptNotFound)?;
    if attempt.is_completed() {
        return Err(AssessmentError::AlreadySubmitted);
    }

    let module = Module::find_by_id_in(&mut tx, attempt.module_id())
        .await?
        .ok_or(AssessmentError::ModuleNotFound)?;

    let key = QuestionKey::from_rows(AnswerKeyRow::fetch_by_module(&mut tx, module.id()).await?);
    let card = scoring::score_submission(&key, answers);
    let passed = scoring::is_passing(card.percentage, module.passing_score());

    let completion = AssessmentCompletion {
        score: card.earned,
        total_points: card.total,
        percentage: card.percentage,
        passed,
        feedback: scoring::feedback(passed, module.max_attempts(), attempt.attempt_number()),
    };

    // a concurrent submission may have completed it after our read
    let assessment = Assessment::complete(&mut tx, attempt.id(), completion)
        .await?
        .ok_or(AssessmentError::AlreadySubmitted)?;

    if passed {
        ModuleProgress::upsert_completed(&mut tx, assessment.user_id(), module.id()).await?;
        unlock_next_module(&mut tx, &module).await?;
    }

    tx.commit().await?;

    tracing::info!(
        assessment_id = %assessment.id(),
        score = %card.summary(),
        passed,
        "assessment submitted"
    );

    Ok(SubmissionResult {
        score: card.summary(),
        percentage: card.percentage,
        results: card.results,
        passed,
        assessment,
    })
}

/// Clears the lock of the module right after `current` in its course.
/// Returns the unlocked module id, `None` when `current` is the last one.
async fn unlock_next_module(
    conn: &mut PgConnection,
    current: &Module,
) -> AssessmentResult<Option<Uuid>> {
    let modules = Module::find_all_by_course(&mut *conn, current.course_id()).await?;
    let ordered: Vec<Uuid> = modules.iter().map(Module::id).collect();

    let Some(next) = scoring::next_in_sequence(&ordered, current.id()) else {
        return Ok(None);
    };

    Module::set_locked(conn, next, false).await?;
    tracing::info!(module_id = %next, "module unlocked");
    Ok(Some(next))
}

/// Attempts of `user_id` on `module_id`, most recent first.
pub async fn assessment_history(
    mm: &ModelManager,
    user_id: Uuid,
    module_id: Uuid,
) -> AssessmentResult<Vec<Assessment>> {
    Ok(Assessment::history(mm, user_id, module_id).await?)
}

/// Questions of a module in order, with their options (correctness included;
/// callers pick the representation they expose).
pub async fn module_questions(
    mm: &ModelManager,
    module_id: Uuid,
) -> AssessmentResult<Vec<QuestionWithAnswersRow>> {
    {
        let mut conn = mm.executor().acquire().await?;
        Module::find_by_id_in(&mut conn, module_id)
            .await?
            .ok_or(AssessmentError::ModuleNotFound)?;
    }

    Ok(QuestionWithAnswersRow::fetch_by_module(mm, module_id).await?)
}
