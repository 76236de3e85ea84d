use serde::{Deserialize, Serialize};

use campus_core::error::require_text;
use campus_core::{DomainResult, EmailAddress, Entity, StudentId};

/// Unvalidated student input (create and update share it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
    /// Institutional registration number (unique among students).
    pub registration: String,
}

/// Student (Aluno).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: EmailAddress,
    pub registration: String,
}

impl Student {
    pub fn create(id: StudentId, draft: StudentDraft) -> DomainResult<Self> {
        let (name, email, registration) = validate(draft)?;
        Ok(Self {
            id,
            name,
            email,
            registration,
        })
    }

    /// Replace all editable fields; the identifier is kept.
    pub fn update(&self, draft: StudentDraft) -> DomainResult<Self> {
        Self::create(self.id, draft)
    }
}

fn validate(draft: StudentDraft) -> DomainResult<(String, EmailAddress, String)> {
    let name = require_text("name", &draft.name)?;
    let email = EmailAddress::parse(&draft.email)?;
    let registration = require_text("registration", &draft.registration)?;
    Ok((name, email, registration))
}

impl Entity for Student {
    type Id = StudentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
