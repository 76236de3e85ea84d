//! Enrollment persistence gateway.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use campus_core::{CourseId, DomainError, DomainResult, EnrollmentId, StudentId};
use campus_enrollment::Enrollment;

/// Persistence capabilities the enrollment workflow needs.
pub trait EnrollmentRepository: Send + Sync {
    /// Fails with `NotFound` when no enrollment has this id.
    fn find_by_id(&self, id: EnrollmentId) -> DomainResult<Enrollment>;

    fn exists_by_pair(&self, student_id: StudentId, course_id: CourseId) -> bool;

    /// Store a new enrollment.
    ///
    /// Re-checks the (student, course) pair atomically with the write and
    /// fails with `Conflict`, so a race between the caller's existence check
    /// and this insert cannot produce a duplicate.
    fn insert(&self, enrollment: Enrollment) -> DomainResult<()>;

    /// Persist a mutated enrollment. Fails with `NotFound` if it was removed
    /// in the meantime.
    fn save(&self, enrollment: Enrollment) -> DomainResult<()>;

    fn delete(&self, id: EnrollmentId) -> DomainResult<Enrollment>;

    fn list(&self) -> Vec<Enrollment>;

    fn any_for_student(&self, student_id: StudentId) -> bool;

    fn any_for_course(&self, course_id: CourseId) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemoryEnrollmentRepository {
    inner: RwLock<HashMap<EnrollmentId, Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn any(&self, predicate: impl Fn(&Enrollment) -> bool) -> bool {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().any(predicate)
    }
}

impl EnrollmentRepository for InMemoryEnrollmentRepository {
    fn find_by_id(&self, id: EnrollmentId) -> DomainResult<Enrollment> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("enrollment"))
    }

    fn exists_by_pair(&self, student_id: StudentId, course_id: CourseId) -> bool {
        self.any(|e| e.student_id() == student_id && e.course_id() == course_id)
    }

    fn insert(&self, enrollment: Enrollment) -> DomainResult<()> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let duplicate = map.values().any(|e| {
            e.student_id() == enrollment.student_id() && e.course_id() == enrollment.course_id()
        });
        if duplicate {
            return Err(DomainError::conflict(format!(
                "student {} is already enrolled in course {}",
                enrollment.student_id(),
                enrollment.course_id()
            )));
        }
        if map.contains_key(&enrollment.id_typed()) {
            return Err(DomainError::conflict(format!(
                "enrollment {} already exists",
                enrollment.id_typed()
            )));
        }

        map.insert(enrollment.id_typed(), enrollment);
        Ok(())
    }

    fn save(&self, enrollment: Enrollment) -> DomainResult<()> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match map.get_mut(&enrollment.id_typed()) {
            Some(slot) => {
                *slot = enrollment;
                Ok(())
            }
            None => Err(DomainError::not_found("enrollment")),
        }
    }

    fn delete(&self, id: EnrollmentId) -> DomainResult<Enrollment> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(&id).ok_or_else(|| DomainError::not_found("enrollment"))
    }

    fn list(&self) -> Vec<Enrollment> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.values().cloned().collect()
    }

    fn any_for_student(&self, student_id: StudentId) -> bool {
        self.any(|e| e.student_id() == student_id)
    }

    fn any_for_course(&self, course_id: CourseId) -> bool {
        self.any(|e| e.course_id() == course_id)
    }
}
