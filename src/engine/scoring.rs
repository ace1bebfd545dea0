//! Pure assessment rules: attempt gating, scoring against the answer key,
//! pass/fail and module sequencing. Nothing in here touches the database.

use std::collections::HashMap;

use uuid::Uuid;

use crate::engine::AssessmentError;
use crate::model::entity::AnswerKeyRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionKey {
    pub answer_id: Uuid,
    pub is_correct: bool,
}

/// A question as the scorer sees it: its weight and its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionKey {
    pub question_id: Uuid,
    pub points: i32,
    pub options: Vec<OptionKey>,
}

impl QuestionKey {
    /// Groups answer key rows (ordered by question) into questions, keeping order.
    pub fn from_rows(rows: Vec<AnswerKeyRow>) -> Vec<Self> {
        let mut keys: Vec<QuestionKey> = Vec::new();

        for row in rows {
            let same_question = keys
                .last()
                .is_some_and(|k| k.question_id == row.question_id);
            if !same_question {
                keys.push(QuestionKey {
                    question_id: row.question_id,
                    points: row.points,
                    options: Vec::new(),
                });
            }

            if let (Some(answer_id), Some(is_correct), Some(key)) =
                (row.answer_id, row.is_correct, keys.last_mut())
            {
                key.options.push(OptionKey {
                    answer_id,
                    is_correct,
                });
            }
        }

        keys
    }

    /// Only options of this very question count; ids of other questions'
    /// options resolve to nothing. A bank-wide lookup of the answer id would
    /// let a correct option of one question score on another.
    fn accepts(&self, answer_id: Uuid) -> bool {
        self.options
            .iter()
            .any(|o| o.answer_id == answer_id && o.is_correct)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub earned: i32,
    pub total: i32,
    pub percentage: f64,
    pub results: HashMap<Uuid, bool>,
}

impl ScoreCard {
    /// `"<earned>/<total>"`
    pub fn summary(&self) -> String {
        format!("{}/{}", self.earned, self.total)
    }
}

/// Scores `answers` (question id -> chosen answer id) against the key.
/// Missing and unresolvable selections are wrong, never an error.
pub fn score_submission(questions: &[QuestionKey], answers: &HashMap<Uuid, Uuid>) -> ScoreCard {
    let mut earned = 0;
    let mut total = 0;
    let mut results = HashMap::with_capacity(questions.len());

    for question in questions {
        total += question.points;

        let correct = answers
            .get(&question.question_id)
            .is_some_and(|answer_id| question.accepts(*answer_id));
        if correct {
            earned += question.points;
        }
        results.insert(question.question_id, correct);
    }

    ScoreCard {
        earned,
        total,
        percentage: percentage(earned, total),
        results,
    }
}

pub fn percentage(earned: i32, total: i32) -> f64 {
    if total > 0 {
        f64::from(earned) * 100.0 / f64::from(total)
    } else {
        0.0
    }
}

pub fn is_passing(percentage: f64, passing_score: i32) -> bool {
    percentage >= f64::from(passing_score)
}

pub fn feedback(passed: bool, max_attempts: i32, attempt_number: i32) -> String {
    if passed {
        String::from("Congratulations! You passed the assessment.")
    } else {
        let remaining = max_attempts - attempt_number;
        format!("You did not pass. You have {remaining} attempt(s) remaining.")
    }
}

/// Checks the start preconditions on the module and hands out the next
/// attempt number.
pub fn next_attempt_number(
    is_locked: bool,
    max_attempts: i32,
    prior_attempts: i64,
) -> Result<i32, AssessmentError> {
    if is_locked {
        return Err(AssessmentError::ModuleLocked);
    }

    if prior_attempts >= i64::from(max_attempts) {
        return Err(AssessmentError::LimitExceeded { max: max_attempts });
    }

    // prior_attempts < max_attempts, which fits in i32
    Ok(prior_attempts as i32 + 1)
}

/// The module right after `current` in a course sequence, if any.
pub fn next_in_sequence(ordered: &[Uuid], current: Uuid) -> Option<Uuid> {
    let pos = ordered.iter().position(|id| *id == current)?;
    ordered.get(pos + 1).copied()
}

/// Per-user accessibility of an ordered module list, given whether the user
/// passed each module: the first one is always open, every other one opens
/// once its predecessor is passed.
pub fn accessibility(passed_in_order: &[bool]) -> Vec<bool> {
    (0..passed_in_order.len())
        .map(|i| i == 0 || passed_in_order[i - 1])
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    struct Bank {
        q1: Uuid,
        q2: Uuid,
        q1_right: Uuid,
        q1_wrong: Uuid,
        q2_right: Uuid,
        q2_wrong: Uuid,
        keys: Vec<QuestionKey>,
    }

    // two questions worth 10 points each, one right and one wrong option apiece
    fn bank() -> Bank {
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let (q1_right, q1_wrong) = (Uuid::new_v4(), Uuid::new_v4());
        let (q2_right, q2_wrong) = (Uuid::new_v4(), Uuid::new_v4());

        let key = |question_id, right, wrong| QuestionKey {
            question_id,
            points: 10,
            options: vec![
                OptionKey {
                    answer_id: right,
                    is_correct: true,
                },
                OptionKey {
                    answer_id: wrong,
                    is_correct: false,
                },
            ],
        };

        Bank {
            q1,
            q2,
            q1_right,
            q1_wrong,
            q2_right,
            q2_wrong,
            keys: vec![key(q1, q1_right, q1_wrong), key(q2, q2_right, q2_wrong)],
        }
    }

    #[test]
    fn all_correct_passes() {
        let b = bank();
        let answers = HashMap::from([(b.q1, b.q1_right), (b.q2, b.q2_right)]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.earned, 20);
        assert_eq!(card.total, 20);
        assert_eq!(card.percentage, 100.0);
        assert_eq!(card.summary(), "20/20");
        assert!(is_passing(card.percentage, 70));
        assert_eq!(card.results, HashMap::from([(b.q1, true), (b.q2, true)]));
    }

    #[test]
    fn half_correct_fails() {
        let b = bank();
        let answers = HashMap::from([(b.q1, b.q1_right), (b.q2, b.q2_wrong)]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.percentage, 50.0);
        assert_eq!(card.summary(), "10/20");
        assert!(!is_passing(card.percentage, 70));
        assert!(!card.results[&b.q2]);
    }

    #[test]
    fn empty_submission_scores_zero() {
        let b = bank();

        let card = score_submission(&b.keys, &HashMap::new());
        assert_eq!(card.percentage, 0.0);
        assert!(!is_passing(card.percentage, 70));
        assert_eq!(card.results.len(), 2);
        assert!(card.results.values().all(|ok| !ok));
    }

    #[test]
    fn missing_answer_is_wrong_not_an_error() {
        let b = bank();
        let answers = HashMap::from([(b.q1, b.q1_right)]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.earned, 10);
        assert!(!card.results[&b.q2]);
    }

    #[test]
    fn unknown_and_foreign_answer_ids_are_wrong() {
        let b = bank();
        // q2's correct option offered as the answer to q1, random id for q2
        let answers = HashMap::from([(b.q1, b.q2_right), (b.q2, Uuid::new_v4())]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.earned, 0);
        assert_eq!(card.results, HashMap::from([(b.q1, false), (b.q2, false)]));
    }

    #[test]
    fn wrong_choices_score_nothing() {
        let b = bank();
        let answers = HashMap::from([(b.q1, b.q1_wrong), (b.q2, b.q2_wrong)]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.summary(), "0/20");
        assert_eq!(card.percentage, 0.0);
    }

    #[test]
    fn answers_for_unknown_questions_are_ignored() {
        let b = bank();
        let answers = HashMap::from([
            (b.q1, b.q1_right),
            (b.q2, b.q2_right),
            (Uuid::new_v4(), Uuid::new_v4()),
        ]);

        let card = score_submission(&b.keys, &answers);
        assert_eq!(card.percentage, 100.0);
        assert_eq!(card.results.len(), 2);
    }

    #[test]
    fn zero_question_module_is_zero_percent() {
        let card = score_submission(&[], &HashMap::new());
        assert_eq!(card.total, 0);
        assert_eq!(card.percentage, 0.0);
        assert_eq!(card.summary(), "0/0");
        assert!(!is_passing(card.percentage, 70));
        assert!(is_passing(card.percentage, 0));
    }

    #[test]
    fn weighted_questions() {
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let (a1, a2) = (Uuid::new_v4(), Uuid::new_v4());
        let keys = vec![
            QuestionKey {
                question_id: q1,
                points: 3,
                options: vec![OptionKey {
                    answer_id: a1,
                    is_correct: true,
                }],
            },
            QuestionKey {
                question_id: q2,
                points: 1,
                options: vec![OptionKey {
                    answer_id: a2,
                    is_correct: true,
                }],
            },
        ];

        let card = score_submission(&keys, &HashMap::from([(q1, a1)]));
        assert_eq!(card.percentage, 75.0);
        assert!(is_passing(card.percentage, 70));
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        assert!(is_passing(70.0, 70));
        assert!(!is_passing(69.99, 70));
    }

    #[test]
    fn attempt_numbers_are_contiguous_until_the_quota() {
        let numbers: Vec<i32> = (0..3)
            .map(|prior| next_attempt_number(false, 3, prior).unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        assert!(matches!(
            next_attempt_number(false, 3, 3),
            Err(AssessmentError::LimitExceeded { max: 3 })
        ));
    }

    #[test]
    fn locked_module_rejects_any_history() {
        for prior in [0, 1, 5] {
            assert!(matches!(
                next_attempt_number(true, 3, prior),
                Err(AssessmentError::ModuleLocked)
            ));
        }
    }

    #[test]
    fn limit_message_names_the_quota() {
        let err = next_attempt_number(false, 3, 3).unwrap_err();
        assert_eq!(err.to_string(), "maximum attempts (3) reached");
    }

    #[test]
    fn feedback_text() {
        assert_eq!(
            feedback(true, 3, 1),
            "Congratulations! You passed the assessment."
        );
        assert_eq!(
            feedback(false, 3, 1),
            "You did not pass. You have 2 attempt(s) remaining."
        );
        assert_eq!(
            feedback(false, 3, 3),
            "You did not pass. You have 0 attempt(s) remaining."
        );
    }

    #[test]
    fn next_module_is_exactly_one_step_ahead() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        assert_eq!(next_in_sequence(&ids, ids[0]), Some(ids[1]));
        assert_eq!(next_in_sequence(&ids, ids[1]), Some(ids[2]));
        assert_eq!(next_in_sequence(&ids, ids[2]), None);
        assert_eq!(next_in_sequence(&ids, Uuid::new_v4()), None);
    }

    #[test]
    fn accessibility_follows_predecessor() {
        assert_eq!(accessibility(&[]), Vec::<bool>::new());
        assert_eq!(accessibility(&[false]), vec![true]);
        assert_eq!(
            accessibility(&[true, false, true, false]),
            vec![true, true, false, true]
        );
    }

    #[test]
    fn key_rows_group_by_question_in_order() {
        let (q1, q2, q3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (a1, a2, a3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let row = |question_id, points, answer: Option<(Uuid, bool)>| AnswerKeyRow {
            question_id,
            points,
            answer_id: answer.map(|a| a.0),
            is_correct: answer.map(|a| a.1),
        };

        let keys = QuestionKey::from_rows(vec![
            row(q1, 2, Some((a1, true))),
            row(q1, 2, Some((a2, false))),
            row(q2, 1, None),
            row(q3, 5, Some((a3, true))),
        ]);

        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].question_id, q1);
        assert_eq!(keys[0].options.len(), 2);
        assert!(keys[1].options.is_empty());
        assert_eq!(keys[2].points, 5);

        // a question without options still counts towards the total
        let card = score_submission(&keys, &HashMap::from([(q1, a1), (q3, a3)]));
        assert_eq!(card.summary(), "7/8");
    }
}
