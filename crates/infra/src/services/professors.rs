use serde_json::json;

use campus_auth::{AccountProfile, Principal, Role};
use campus_core::{DomainError, DomainResult, ProfessorId};
use campus_people::{Professor, ProfessorDraft};

use super::Stores;
use super::accounts::{
    ensure_email_available, open_profile_account, profile_account_id, remove_profile_account,
    sync_profile_email,
};
use super::error::{ServiceResult, require};
use crate::audit::Auditor;

#[derive(Debug, Clone)]
pub struct ProfessorService {
    stores: Stores,
    audit: Auditor,
}

impl ProfessorService {
    pub(crate) fn new(stores: Stores) -> Self {
        let audit = Auditor::new("professors", stores.audit_sink.clone());
        Self { stores, audit }
    }

    /// Register a professor and open its `PROFESSOR` account.
    #[tracing::instrument(skip_all)]
    pub fn create(&self, principal: &Principal, draft: ProfessorDraft) -> ServiceResult<Professor> {
        require(principal, "professors.create")?;

        let result = Professor::create(ProfessorId::new(), draft).and_then(|professor| {
            ensure_email_available(self.stores.accounts.as_ref(), &professor.email, None)?;
            open_profile_account(
                self.stores.accounts.as_ref(),
                professor.email.clone(),
                Role::Professor,
                AccountProfile::Professor(professor.id),
            )?;
            self.stores.professors.upsert(professor.id, professor.clone());
            Ok(professor)
        });

        match &result {
            Ok(professor) => self.audit.info(
                "create",
                principal.email.as_str(),
                "professor.create",
                format!("professor {} registered", professor.email),
                json!({ "professor_id": professor.id }),
            ),
            Err(err) => self.audit.error(
                "create",
                principal.email.as_str(),
                "professor.create.error",
                format!("failed to register professor: {err}"),
                json!({ "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    #[tracing::instrument(skip_all, fields(professor_id = %id))]
    pub fn update(
        &self,
        principal: &Principal,
        id: ProfessorId,
        draft: ProfessorDraft,
    ) -> ServiceResult<Professor> {
        require(principal, "professors.update")?;

        let updated = self.find(id)?.update(draft)?;
        let profile = AccountProfile::Professor(id);
        let account_id = profile_account_id(self.stores.accounts.as_ref(), profile);
        ensure_email_available(self.stores.accounts.as_ref(), &updated.email, account_id)?;

        self.stores.professors.upsert(id, updated.clone());
        sync_profile_email(self.stores.accounts.as_ref(), profile, &updated.email);
        tracing::info!(professor_id = %id, "professor updated");
        Ok(updated)
    }

    /// Fails with `Conflict` while a course names this professor as responsible.
    #[tracing::instrument(skip_all, fields(professor_id = %id))]
    pub fn delete(&self, principal: &Principal, id: ProfessorId) -> ServiceResult<()> {
        require(principal, "professors.delete")?;

        let result = self.find(id).and_then(|_| {
            if self.stores.courses.any(&|c| c.professor_id == id) {
                return Err(DomainError::conflict(format!(
                    "professor {id} is responsible for at least one course"
                )));
            }
            self.stores.professors.remove(&id);
            remove_profile_account(self.stores.accounts.as_ref(), AccountProfile::Professor(id));
            Ok(())
        });

        match &result {
            Ok(()) => self.audit.info(
                "delete",
                principal.email.as_str(),
                "professor.delete",
                format!("professor {id} deleted"),
                json!({ "professor_id": id }),
            ),
            Err(err) => self.audit.error(
                "delete",
                principal.email.as_str(),
                "professor.delete.error",
                format!("failed to delete professor {id}: {err}"),
                json!({ "professor_id": id, "error": err.to_string() }),
            ),
        }
        Ok(result?)
    }

    pub fn get(&self, principal: &Principal, id: ProfessorId) -> ServiceResult<Professor> {
        require(principal, "professors.read")?;
        Ok(self.find(id)?)
    }

    pub fn list(&self, principal: &Principal) -> ServiceResult<Vec<Professor>> {
        require(principal, "professors.read")?;
        let mut professors = self.stores.professors.list();
        professors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(professors)
    }

    /// Profile of the calling professor.
    pub fn me(&self, principal: &Principal) -> ServiceResult<Professor> {
        require(principal, "professors.me")?;
        let account = self
            .stores
            .accounts
            .get(&principal.user_id)
            .ok_or_else(|| DomainError::not_found("user account"))?;
        let id = account
            .professor_id()
            .ok_or_else(|| DomainError::validation("account is not linked to a professor"))?;
        Ok(self.find(id)?)
    }

    fn find(&self, id: ProfessorId) -> DomainResult<Professor> {
        self.stores
            .professors
            .get(&id)
            .ok_or_else(|| DomainError::not_found("professor"))
    }
}
