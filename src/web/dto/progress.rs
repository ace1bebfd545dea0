use serde::Serialize;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProgressSummaryResponse {
    total_modules: i64,
    completed_modules: i64,
    total_attempts: i64,
    passed_attempts: i64,
    /// Mean percentage over submitted attempts, 0 without any.
    average_percentage: f64,
    username: String,
}

impl ProgressSummaryResponse {
    pub fn new(
        total_modules: i64,
        completed_modules: i64,
        total_attempts: i64,
        passed_attempts: i64,
        average_percentage: f64,
        username: String,
    ) -> Self {
        Self {
            total_modules,
            completed_modules,
            total_attempts,
            passed_attempts,
            average_percentage,
            username,
        }
    }
}
