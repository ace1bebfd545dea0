pub mod assessments;
pub mod courses;
pub mod progress;
pub mod questions;
