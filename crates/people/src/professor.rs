use serde::{Deserialize, Serialize};

use campus_core::error::require_text;
use campus_core::{DomainResult, EmailAddress, Entity, ProfessorId};

/// Unvalidated professor input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessorDraft {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    pub email: EmailAddress,
}

impl Professor {
    pub fn create(id: ProfessorId, draft: ProfessorDraft) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: require_text("name", &draft.name)?,
            email: EmailAddress::parse(&draft.email)?,
        })
    }

    pub fn update(&self, draft: ProfessorDraft) -> DomainResult<Self> {
        Self::create(self.id, draft)
    }
}

impl Entity for Professor {
    type Id = ProfessorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::DomainError;

    #[test]
    fn invalid_email_is_rejected() {
        let err = Professor::create(
            ProfessorId::new(),
            ProfessorDraft {
                name: "Maria Silva".to_string(),
                email: "maria.silva".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
