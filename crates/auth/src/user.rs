//! User accounts: who may act, with which role, on behalf of which profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_core::{DomainError, DomainResult, EmailAddress, Entity, ProfessorId, StudentId, UserId};

use crate::{Principal, Role};

/// Academic profile an account represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AccountProfile {
    /// Administrators have no academic profile.
    None,
    Student(StudentId),
    Professor(ProfessorId),
}

/// Input for account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    pub email: EmailAddress,
    pub role: Role,
    pub profile: AccountProfile,
}

/// Stored user account.
///
/// # Invariants
/// - `ALUNO` accounts link a student profile, `PROFESSOR` accounts a professor
///   profile, `ADMIN` accounts none.
/// - Email is unique across accounts (enforced by the account service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: EmailAddress,
    pub role: Role,
    pub profile: AccountProfile,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn create(id: UserId, new: NewUserAccount, now: DateTime<Utc>) -> DomainResult<Self> {
        let consistent = matches!(
            (new.role, new.profile),
            (Role::Admin, AccountProfile::None)
                | (Role::Aluno, AccountProfile::Student(_))
                | (Role::Professor, AccountProfile::Professor(_))
        );
        if !consistent {
            return Err(DomainError::invariant(format!(
                "role {} cannot be linked to profile {:?}",
                new.role, new.profile
            )));
        }

        Ok(Self {
            id,
            email: new.email,
            role: new.role,
            profile: new.profile,
            created_at: now,
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.email.clone(), self.role)
    }

    pub fn student_id(&self) -> Option<StudentId> {
        match self.profile {
            AccountProfile::Student(id) => Some(id),
            _ => None,
        }
    }

    pub fn professor_id(&self) -> Option<ProfessorId> {
        match self.profile {
            AccountProfile::Professor(id) => Some(id),
            _ => None,
        }
    }
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    #[test]
    fn student_account_links_student_profile() {
        let student_id = StudentId::new();
        let account = UserAccount::create(
            UserId::new(),
            NewUserAccount {
                email: email("joao@email.com"),
                role: Role::Aluno,
                profile: AccountProfile::Student(student_id),
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(account.student_id(), Some(student_id));
        assert_eq!(account.professor_id(), None);
        assert_eq!(account.principal().role, Role::Aluno);
    }

    #[test]
    fn admin_with_profile_is_rejected() {
        let err = UserAccount::create(
            UserId::new(),
            NewUserAccount {
                email: email("admin@campus.edu"),
                role: Role::Admin,
                profile: AccountProfile::Student(StudentId::new()),
            },
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn profile_serializes_with_kind_tag() {
        let json = serde_json::to_value(AccountProfile::None).unwrap();
        assert_eq!(json["kind"], "none");
    }
}
