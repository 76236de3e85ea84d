//! Enrollment domain module: grading rules and the enrollment lifecycle.
//!
//! Pure, synchronous and deterministic (no IO, no logging, no storage).
//! Persistence, lookups and auditing are supplied by callers.

pub mod enrollment;
pub mod grading;

pub use enrollment::{
    EnrollStudent, Enrollment, ScoreUpdate, recompute_grade_state, validate_enrollment_uniqueness,
};
pub use grading::{Average, EnrollmentStatus, PASSING_AVERAGE, Score};
