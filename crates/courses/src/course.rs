use serde::{Deserialize, Serialize};

use campus_core::error::require_text;
use campus_core::{CourseId, DomainResult, Entity, ProfessorId};

/// Unvalidated course input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    /// Short unique code, e.g. `ALG101`.
    pub code: String,
    pub professor_id: ProfessorId,
}

/// Course taught by exactly one responsible professor.
///
/// The professor is referenced by id only; resolving it is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub code: String,
    pub professor_id: ProfessorId,
}

impl Course {
    pub fn create(id: CourseId, draft: CourseDraft) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: require_text("name", &draft.name)?,
            code: require_text("code", &draft.code)?.to_uppercase(),
            professor_id: draft.professor_id,
        })
    }

    pub fn update(&self, draft: CourseDraft) -> DomainResult<Self> {
        Self::create(self.id, draft)
    }
}

impl Entity for Course {
    type Id = CourseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
