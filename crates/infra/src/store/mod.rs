//! Storage abstractions and their in-memory implementations.

pub mod enrollments;
pub mod record_store;

pub use enrollments::{EnrollmentRepository, InMemoryEnrollmentRepository};
pub use record_store::{InMemoryRecordStore, RecordStore};
