mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreate};

mod module;
pub use module::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PASSING_SCORE, Module, ModuleCreate, ModuleWithPassRow,
};

mod question;
pub use question::{
    AnswerKeyRow, Question, QuestionAnswerCreate, QuestionCreate, QuestionWithAnswersRow,
};

mod answer;
pub use answer::{Answer, AnswerCreate};

mod assessment;
pub use assessment::{Assessment, AssessmentCompletion};

mod module_progress;
pub use module_progress::ModuleProgress;
