use serde::Serialize;
use uuid::Uuid;

use crate::{engine::scoring, model::entity::ModuleWithPassRow};

/// Course module as seen by one learner.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModuleAccessResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub passing_score: i32,
    pub max_attempts: i32,
    pub is_locked: bool,
    /// Whether the learner passed this module.
    pub passed: bool,
    /// First module, or the previous one is passed.
    pub accessible: bool,
}

impl ModuleAccessResponse {
    /// `rows` must be in course order.
    pub fn from_rows(rows: Vec<ModuleWithPassRow>) -> Vec<Self> {
        let passed: Vec<bool> = rows.iter().map(|r| r.passed).collect();
        let accessible = scoring::accessibility(&passed);

        rows.into_iter()
            .zip(accessible)
            .map(|(row, accessible)| Self {
                id: row.id,
                course_id: row.course_id,
                title: row.title,
                description: row.description,
                order_index: row.order_index,
                passing_score: row.passing_score,
                max_attempts: row.max_attempts,
                is_locked: row.is_locked,
                passed: row.passed,
                accessible,
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(order_index: i32, passed: bool) -> ModuleWithPassRow {
        ModuleWithPassRow {
            id: Uuid::new_v4(),
            course_id: Uuid::nil(),
            title: format!("Module {order_index}"),
            description: String::new(),
            order_index,
            passing_score: 70,
            max_attempts: 3,
            is_locked: order_index > 0,
            passed,
        }
    }

    #[test]
    fn accessibility_follows_previous_pass() {
        let modules =
            ModuleAccessResponse::from_rows(vec![row(0, true), row(1, false), row(2, false)]);

        let flags: Vec<bool> = modules.iter().map(|m| m.accessible).collect();
        assert_eq!(flags, vec![true, true, false]);
        assert_eq!(modules[0].title, "Module 0");
    }

    #[test]
    fn empty_course_has_no_modules() {
        assert!(ModuleAccessResponse::from_rows(Vec::new()).is_empty());
    }
}
