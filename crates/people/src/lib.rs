//! Students and professors.
//!
//! Plain records plus the validation their constructors enforce. Uniqueness
//! of emails and registration numbers needs storage and is checked by the
//! services in `campus-infra`.

pub mod professor;
pub mod student;

pub use professor::{Professor, ProfessorDraft};
pub use student::{Student, StudentDraft};
