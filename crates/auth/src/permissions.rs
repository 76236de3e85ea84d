use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "enrollments.grade").
/// The wildcard permission `"*"` grants everything and is reserved for admins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

const PROFESSOR_PERMISSIONS: &[&str] = &[
    "students.read",
    "courses.read",
    "enrollments.read",
    "enrollments.grade",
    "professors.me",
];

const ALUNO_PERMISSIONS: &[&str] = &["courses.read", "enrollments.read", "students.me"];

/// Static role→permission policy.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    let names: &[&'static str] = match role {
        Role::Admin => &["*"],
        Role::Professor => PROFESSOR_PERMISSIONS,
        Role::Aluno => ALUNO_PERMISSIONS,
    };
    names.iter().copied().map(Permission::from_static).collect()
}
