use serde_json::json;

use campus_auth::{AccountProfile, Principal, Role};
use campus_core::{DomainError, DomainResult, Entity, StudentId};
use campus_people::{Student, StudentDraft};

use super::Stores;
use super::accounts::{
    ensure_email_available, open_profile_account, profile_account_id, remove_profile_account,
    sync_profile_email,
};
use super::error::{ServiceResult, require};
use crate::audit::Auditor;

/// Student registry. Each student owns an `ALUNO` account with the same email.
#[derive(Debug, Clone)]
pub struct StudentService {
    stores: Stores,
    audit: Auditor,
}

impl StudentService {
    pub(crate) fn new(stores: Stores) -> Self {
        let audit = Auditor::new("students", stores.audit_sink.clone());
        Self { stores, audit }
    }

    #[tracing::instrument(skip_all, fields(registration = %draft.registration))]
    pub fn create(&self, principal: &Principal, draft: StudentDraft) -> ServiceResult<Student> {
        require(principal, "students.create")?;

        let result = self.register(draft);
        match &result {
            Ok(student) => self.audit.info(
                "create",
                principal.email.as_str(),
                "student.create",
                format!("student {} registered", student.registration),
                json!({ "student_id": student.id }),
            ),
            Err(err) => self.audit.error(
                "create",
                principal.email.as_str(),
                "student.create.error",
                format!("failed to register student: {err}"),
                json!({ "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    fn register(&self, draft: StudentDraft) -> DomainResult<Student> {
        let student = Student::create(StudentId::new(), draft)?;
        ensure_email_available(self.stores.accounts.as_ref(), &student.email, None)?;
        self.ensure_registration_available(&student)?;

        open_profile_account(
            self.stores.accounts.as_ref(),
            student.email.clone(),
            Role::Aluno,
            AccountProfile::Student(student.id),
        )?;
        self.stores.students.upsert(student.id, student.clone());
        Ok(student)
    }

    #[tracing::instrument(skip_all, fields(student_id = %id))]
    pub fn update(
        &self,
        principal: &Principal,
        id: StudentId,
        draft: StudentDraft,
    ) -> ServiceResult<Student> {
        require(principal, "students.update")?;

        let current = self.find(id)?;
        let updated = current.update(draft)?;
        let profile = AccountProfile::Student(id);
        let account_id = profile_account_id(self.stores.accounts.as_ref(), profile);
        ensure_email_available(self.stores.accounts.as_ref(), &updated.email, account_id)?;
        self.ensure_registration_available(&updated)?;

        self.stores.students.upsert(id, updated.clone());
        sync_profile_email(self.stores.accounts.as_ref(), profile, &updated.email);
        tracing::info!(student_id = %id, "student updated");
        Ok(updated)
    }

    /// Fails with `Conflict` while enrollments reference the student.
    #[tracing::instrument(skip_all, fields(student_id = %id))]
    pub fn delete(&self, principal: &Principal, id: StudentId) -> ServiceResult<()> {
        require(principal, "students.delete")?;

        let result = self.find(id).and_then(|student| {
            if self.stores.enrollments.any_for_student(id) {
                return Err(DomainError::conflict(format!(
                    "student {} still has enrollments",
                    student.registration
                )));
            }
            self.stores.students.remove(&id);
            remove_profile_account(self.stores.accounts.as_ref(), AccountProfile::Student(id));
            Ok(())
        });

        match &result {
            Ok(()) => self.audit.info(
                "delete",
                principal.email.as_str(),
                "student.delete",
                format!("student {id} deleted"),
                json!({ "student_id": id }),
            ),
            Err(err) => self.audit.error(
                "delete",
                principal.email.as_str(),
                "student.delete.error",
                format!("failed to delete student {id}: {err}"),
                json!({ "student_id": id, "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    pub fn get(&self, principal: &Principal, id: StudentId) -> ServiceResult<Student> {
        require(principal, "students.read")?;
        Ok(self.find(id)?)
    }

    /// All students ordered by name.
    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Student>> {
        require(principal, "students.read")?;
        let mut students = self.stores.students.list();
        students.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(students)
    }

    /// Profile of the calling student.
    pub fn me(&self, principal: &Principal) -> ServiceResult<Student> {
        require(principal, "students.me")?;
        let account = self
            .stores
            .accounts
            .get(&principal.user_id)
            .ok_or_else(|| DomainError::not_found("user account"))?;
        let id = account
            .student_id()
            .ok_or_else(|| DomainError::validation("account is not linked to a student"))?;
        Ok(self.find(id)?)
    }

    fn find(&self, id: StudentId) -> DomainResult<Student> {
        self.stores
            .students
            .get(&id)
            .ok_or_else(|| DomainError::not_found("student"))
    }

    fn ensure_registration_available(&self, student: &Student) -> DomainResult<()> {
        let taken = self
            .stores
            .students
            .any(&|s| s.registration == student.registration && !s.same_record(student));
        if taken {
            return Err(DomainError::conflict(format!(
                "registration {} is already in use",
                student.registration
            )));
        }
        Ok(())
    }
}
