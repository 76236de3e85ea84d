//! Enrollment workflow: enroll, grade, remove, query.

use chrono::Utc;
use serde_json::json;

use campus_auth::Principal;
use campus_core::{DomainError, DomainResult, EnrollmentId};
use campus_enrollment::{
    EnrollStudent, Enrollment, ScoreUpdate, recompute_grade_state, validate_enrollment_uniqueness,
};

use super::Stores;
use super::error::{ServiceResult, require};
use crate::audit::Auditor;

#[derive(Debug, Clone)]
pub struct EnrollmentService {
    stores: Stores,
    audit: Auditor,
}

impl EnrollmentService {
    pub(crate) fn new(stores: Stores) -> Self {
        let audit = Auditor::new("enrollments", stores.audit_sink.clone());
        Self { stores, audit }
    }

    /// Enroll a student in a course.
    ///
    /// The duplicate check runs before the student and course are looked up,
    /// so a repeated request fails with `Conflict` even if either record has
    /// since disappeared.
    #[tracing::instrument(skip_all, fields(student_id = %cmd.student_id, course_id = %cmd.course_id))]
    pub fn enroll(&self, principal: &Principal, cmd: EnrollStudent) -> ServiceResult<Enrollment> {
        require(principal, "enrollments.create")?;

        let result = self.open(cmd);
        match &result {
            Ok(enrollment) => self.audit.info(
                "enroll",
                principal.email.as_str(),
                "enrollment.create",
                format!(
                    "student {} enrolled in course {}",
                    cmd.student_id, cmd.course_id
                ),
                json!({
                    "enrollment_id": enrollment.id_typed(),
                    "student_id": cmd.student_id,
                    "course_id": cmd.course_id,
                }),
            ),
            Err(err) => self.audit.error(
                "enroll",
                principal.email.as_str(),
                "enrollment.create.error",
                format!("failed to enroll student {}: {err}", cmd.student_id),
                json!({
                    "student_id": cmd.student_id,
                    "course_id": cmd.course_id,
                    "error": err.to_string(),
                }),
            ),
        }
        Ok(result?)
    }

    fn open(&self, cmd: EnrollStudent) -> DomainResult<Enrollment> {
        let repo = &self.stores.enrollments;
        validate_enrollment_uniqueness(cmd.student_id, cmd.course_id, |student, course| {
            repo.exists_by_pair(student, course)
        })?;

        if self.stores.students.get(&cmd.student_id).is_none() {
            return Err(DomainError::not_found("student"));
        }
        if self.stores.courses.get(&cmd.course_id).is_none() {
            return Err(DomainError::not_found("course"));
        }

        let enrollment =
            Enrollment::open(EnrollmentId::new(), cmd.student_id, cmd.course_id, Utc::now());
        repo.insert(enrollment.clone())?;
        Ok(enrollment)
    }

    /// Record scores and recompute average and status.
    ///
    /// Absent fields in `update` keep the stored score.
    #[tracing::instrument(skip_all, fields(enrollment_id = %id))]
    pub fn update_scores(
        &self,
        principal: &Principal,
        id: EnrollmentId,
        update: ScoreUpdate,
    ) -> ServiceResult<Enrollment> {
        require(principal, "enrollments.grade")?;

        let result = self.grade(id, update);
        match &result {
            Ok(enrollment) => self.audit.info(
                "update_scores",
                principal.email.as_str(),
                "enrollment.grade",
                format!("enrollment {id} graded: {}", enrollment.status()),
                json!({
                    "enrollment_id": id,
                    "score1": enrollment.score1(),
                    "score2": enrollment.score2(),
                    "average": enrollment.average(),
                    "status": enrollment.status(),
                }),
            ),
            Err(err) => self.audit.error(
                "update_scores",
                principal.email.as_str(),
                "enrollment.grade.error",
                format!("failed to grade enrollment {id}: {err}"),
                json!({ "enrollment_id": id, "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    fn grade(&self, id: EnrollmentId, update: ScoreUpdate) -> DomainResult<Enrollment> {
        let mut enrollment = self.stores.enrollments.find_by_id(id)?;
        enrollment.record_scores(update);
        recompute_grade_state(&mut enrollment);
        self.stores.enrollments.save(enrollment.clone())?;
        Ok(enrollment)
    }

    #[tracing::instrument(skip_all, fields(enrollment_id = %id))]
    pub fn delete(&self, principal: &Principal, id: EnrollmentId) -> ServiceResult<()> {
        require(principal, "enrollments.delete")?;

        let result = self.stores.enrollments.delete(id);
        match &result {
            Ok(removed) => self.audit.info(
                "delete",
                principal.email.as_str(),
                "enrollment.delete",
                format!("enrollment {id} deleted"),
                json!({
                    "enrollment_id": id,
                    "student_id": removed.student_id(),
                    "course_id": removed.course_id(),
                }),
            ),
            Err(err) => self.audit.error(
                "delete",
                principal.email.as_str(),
                "enrollment.delete.error",
                format!("failed to delete enrollment {id}: {err}"),
                json!({ "enrollment_id": id, "error": err.to_string() }),
            ),
        }
        result?;
        Ok(())
    }

    pub fn get(&self, principal: &Principal, id: EnrollmentId) -> ServiceResult<Enrollment> {
        require(principal, "enrollments.read")?;
        Ok(self.stores.enrollments.find_by_id(id)?)
    }

    /// All enrollments, newest first.
    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Enrollment>> {
        require(principal, "enrollments.list")?;
        let mut enrollments = self.stores.enrollments.list();
        enrollments.sort_by(|a, b| {
            b.enrolled_at()
                .cmp(&a.enrolled_at())
                .then(b.id_typed().cmp(&a.id_typed()))
        });
        Ok(enrollments)
    }
}

#[cfg(test)]
mod tests {
    use campus_core::{CourseId, StudentId};
    use campus_enrollment::EnrollmentStatus;
    use rust_decimal_macros::dec;

    use super::super::testing::{
        add_course, add_professor, add_student, campus, professor_principal, student_principal,
    };
    use super::*;
    use crate::audit::AuditLevel;
    use crate::services::ServiceError;

    fn scores(a: &str, b: &str) -> ScoreUpdate {
        ScoreUpdate {
            score1: Some(a.parse().unwrap()),
            score2: Some(b.parse().unwrap()),
        }
    }

    #[test]
    fn enroll_then_grade() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");
        let student_id = add_student(&services, &admin, 1);

        let enrollment = services
            .enrollments
            .enroll(&admin, EnrollStudent { student_id, course_id })
            .unwrap();
        assert_eq!(enrollment.status(), EnrollmentStatus::Cursando);
        assert_eq!(enrollment.average(), None);

        let professor = professor_principal(&services, professor_id);
        let graded = services
            .enrollments
            .update_scores(&professor, enrollment.id_typed(), scores("8.5", "7.0"))
            .unwrap();
        assert_eq!(graded.average().map(|a| a.value()), Some(dec!(7.75)));
        assert_eq!(graded.status(), EnrollmentStatus::Aprovado);

        let stored = services.enrollments.get(&admin, enrollment.id_typed()).unwrap();
        assert_eq!(stored, graded);
    }

    #[test]
    fn partial_update_keeps_the_other_score() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");
        let student_id = add_student(&services, &admin, 1);
        let id = services
            .enrollments
            .enroll(&admin, EnrollStudent { student_id, course_id })
            .unwrap()
            .id_typed();

        let first = services
            .enrollments
            .update_scores(
                &admin,
                id,
                ScoreUpdate {
                    score1: Some("6.98".parse().unwrap()),
                    score2: None,
                },
            )
            .unwrap();
        assert_eq!(first.status(), EnrollmentStatus::Cursando);

        let second = services
            .enrollments
            .update_scores(
                &admin,
                id,
                ScoreUpdate {
                    score1: None,
                    score2: Some("7.00".parse().unwrap()),
                },
            )
            .unwrap();
        assert_eq!(second.average().map(|a| a.value()), Some(dec!(6.99)));
        assert_eq!(second.status(), EnrollmentStatus::Reprovado);
    }

    #[test]
    fn duplicate_enrollment_conflicts_and_is_audited() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");
        let student_id = add_student(&services, &admin, 1);
        let cmd = EnrollStudent { student_id, course_id };

        services.enrollments.enroll(&admin, cmd).unwrap();
        let err = services.enrollments.enroll(&admin, cmd).unwrap_err();
        assert!(err.is_conflict());

        let errors = services.audit.by_level(&admin, AuditLevel::Error).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].operation, "enrollment.create.error");
        assert_eq!(errors[0].user, "admin@campus.edu");
    }

    #[test]
    fn unknown_references_are_not_found() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");
        let student_id = add_student(&services, &admin, 1);

        let err = services
            .enrollments
            .enroll(&admin, EnrollStudent { student_id: StudentId::new(), course_id })
            .unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::not_found("student")));

        let err = services
            .enrollments
            .enroll(&admin, EnrollStudent { student_id, course_id: CourseId::new() })
            .unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::not_found("course")));

        let missing = EnrollmentId::new();
        assert!(services.enrollments.get(&admin, missing).unwrap_err().is_not_found());
        assert!(
            services
                .enrollments
                .update_scores(&admin, missing, scores("7", "7"))
                .unwrap_err()
                .is_not_found()
        );
        assert!(services.enrollments.delete(&admin, missing).unwrap_err().is_not_found());
    }

    #[test]
    fn role_restrictions() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");
        let student_id = add_student(&services, &admin, 1);
        let professor = professor_principal(&services, professor_id);
        let student = student_principal(&services, student_id);
        let cmd = EnrollStudent { student_id, course_id };

        assert!(services.enrollments.enroll(&professor, cmd).unwrap_err().is_forbidden());
        assert!(services.enrollments.enroll(&student, cmd).unwrap_err().is_forbidden());

        let id = services.enrollments.enroll(&admin, cmd).unwrap().id_typed();
        assert!(
            services
                .enrollments
                .update_scores(&student, id, scores("10", "10"))
                .unwrap_err()
                .is_forbidden()
        );
        assert!(services.enrollments.delete(&professor, id).unwrap_err().is_forbidden());
        assert!(services.enrollments.list(&student).unwrap_err().is_forbidden());
        assert_eq!(services.enrollments.get(&student, id).unwrap().id_typed(), id);
    }

    #[test]
    fn list_is_newest_first() {
        let (services, admin) = campus();
        let professor_id = add_professor(&services, &admin, 1);
        let course_id = add_course(&services, &admin, professor_id, "ALG101");

        let ids: Vec<_> = (1..=3)
            .map(|n| {
                let student_id = add_student(&services, &admin, n);
                services
                    .enrollments
                    .enroll(&admin, EnrollStudent { student_id, course_id })
                    .unwrap()
                    .id_typed()
            })
            .collect();

        let listed: Vec<_> = services
            .enrollments
            .list(&admin)
            .unwrap()
            .iter()
            .map(|e| e.id_typed())
            .collect();
        assert_eq!(listed, ids.into_iter().rev().collect::<Vec<_>>());
    }
}
