use serde_json::json;

use campus_auth::Principal;
use campus_core::{CourseId, DomainError, DomainResult, Entity};
use campus_courses::{Course, CourseDraft};

use super::Stores;
use super::error::{ServiceResult, require};
use crate::audit::Auditor;

/// Course catalogue.
#[derive(Debug, Clone)]
pub struct CourseService {
    stores: Stores,
    audit: Auditor,
}

impl CourseService {
    pub(crate) fn new(stores: Stores) -> Self {
        let audit = Auditor::new("courses", stores.audit_sink.clone());
        Self { stores, audit }
    }

    #[tracing::instrument(skip_all, fields(code = %draft.code))]
    pub fn create(&self, principal: &Principal, draft: CourseDraft) -> ServiceResult<Course> {
        require(principal, "courses.create")?;

        let result = Course::create(CourseId::new(), draft).and_then(|course| {
            self.check_references(&course)?;
            self.stores.courses.upsert(course.id, course.clone());
            Ok(course)
        });

        match &result {
            Ok(course) => self.audit.info(
                "create",
                principal.email.as_str(),
                "course.create",
                format!("course {} created", course.code),
                json!({ "course_id": course.id, "professor_id": course.professor_id }),
            ),
            Err(err) => self.audit.error(
                "create",
                principal.email.as_str(),
                "course.create.error",
                format!("failed to create course: {err}"),
                json!({ "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    #[tracing::instrument(skip_all, fields(course_id = %id))]
    pub fn update(
        &self,
        principal: &Principal,
        id: CourseId,
        draft: CourseDraft,
    ) -> ServiceResult<Course> {
        require(principal, "courses.update")?;

        let updated = self.find(id)?.update(draft)?;
        self.check_references(&updated)?;
        self.stores.courses.upsert(id, updated.clone());
        tracing::info!(course_id = %id, code = %updated.code, "course updated");
        Ok(updated)
    }

    /// Fails with `Conflict` while enrollments reference the course.
    #[tracing::instrument(skip_all, fields(course_id = %id))]
    pub fn delete(&self, principal: &Principal, id: CourseId) -> ServiceResult<()> {
        require(principal, "courses.delete")?;

        let result = self.find(id).and_then(|course| {
            if self.stores.enrollments.any_for_course(id) {
                return Err(DomainError::conflict(format!(
                    "course {} still has enrollments",
                    course.code
                )));
            }
            self.stores.courses.remove(&id);
            Ok(())
        });

        match &result {
            Ok(()) => self.audit.info(
                "delete",
                principal.email.as_str(),
                "course.delete",
                format!("course {id} deleted"),
                json!({ "course_id": id }),
            ),
            Err(err) => self.audit.error(
                "delete",
                principal.email.as_str(),
                "course.delete.error",
                format!("failed to delete course {id}: {err}"),
                json!({ "course_id": id, "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    pub fn get(&self, principal: &Principal, id: CourseId) -> ServiceResult<Course> {
        require(principal, "courses.read")?;
        Ok(self.find(id)?)
    }

    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Course>> {
        require(principal, "courses.read")?;
        let mut courses = self.stores.courses.list();
        courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    fn find(&self, id: CourseId) -> DomainResult<Course> {
        self.stores
            .courses
            .get(&id)
            .ok_or_else(|| DomainError::not_found("course"))
    }

    /// Responsible professor must exist; code must be unique.
    fn check_references(&self, course: &Course) -> DomainResult<()> {
        if self.stores.professors.get(&course.professor_id).is_none() {
            return Err(DomainError::not_found("professor"));
        }
        if self
            .stores
            .courses
            .any(&|c| c.code == course.code && !c.same_record(course))
        {
            return Err(DomainError::conflict(format!(
                "course code {} is already in use",
                course.code
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{add_course, add_professor, add_student, campus, student_principal};
    use super::*;
    use campus_core::ProfessorId;

    fn draft(code: &str, professor_id: ProfessorId) -> CourseDraft {
        CourseDraft {
            name: format!("Course {code}"),
            code: code.to_string(),
            professor_id,
        }
    }

    #[test]
    fn code_is_unique_ignoring_case() {
        let (services, admin) = campus();
        let professor = add_professor(&services, &admin, 1);
        add_course(&services, &admin, professor, "ALG101");

        let err = services
            .courses
            .create(&admin, draft("alg101", professor))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn responsible_professor_must_exist() {
        let (services, admin) = campus();
        let err = services
            .courses
            .create(&admin, draft("ALG101", ProfessorId::new()))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(services.courses.list(&admin).unwrap().is_empty());
    }

    #[test]
    fn students_read_but_do_not_write() {
        let (services, admin) = campus();
        let professor = add_professor(&services, &admin, 1);
        let course = add_course(&services, &admin, professor, "ALG101");
        let student = student_principal(&services, add_student(&services, &admin, 1));

        assert_eq!(services.courses.get(&student, course).unwrap().code, "ALG101");
        assert!(
            services
                .courses
                .create(&student, draft("CAL101", professor))
                .unwrap_err()
                .is_forbidden()
        );
        assert!(services.courses.delete(&student, course).unwrap_err().is_forbidden());
    }

    #[test]
    fn update_can_keep_its_own_code() {
        let (services, admin) = campus();
        let professor = add_professor(&services, &admin, 1);
        let other = add_professor(&services, &admin, 2);
        let course = add_course(&services, &admin, professor, "ALG101");

        let updated = services
            .courses
            .update(&admin, course, draft("ALG101", other))
            .unwrap();
        assert_eq!(updated.professor_id, other);
    }
}
