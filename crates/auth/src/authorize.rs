use serde::Serialize;
use thiserror::Error;

use campus_core::UserId;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal against a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions()
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub user_id: UserId,
    pub role: Role,
    pub effective_permissions: Vec<String>,
    /// Roles that would grant the permission, filled only on denial.
    pub granting_roles: Vec<Role>,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(
    principal: &Principal,
    required: &Permission,
) -> AuthorizationExplanation {
    let mut effective: Vec<String> = principal
        .permissions()
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    effective.sort();

    let has_wildcard = effective.iter().any(|p| p == "*");
    let has_required = effective.iter().any(|p| p == required.as_str());

    if has_wildcard || has_required {
        let reason = if has_wildcard {
            format!("role {} has wildcard permission '*'", principal.role)
        } else {
            format!("role {} grants '{}'", principal.role, required)
        };
        return AuthorizationExplanation {
            required_permission: required.as_str().to_string(),
            granted: true,
            reason,
            user_id: principal.user_id,
            role: principal.role,
            effective_permissions: effective,
            granting_roles: Vec::new(),
        };
    }

    let granting_roles = [Role::Admin, Role::Professor, Role::Aluno]
        .into_iter()
        .filter(|role| {
            crate::permissions_for(*role)
                .iter()
                .any(|p| p.is_wildcard() || p == required)
        })
        .collect();

    AuthorizationExplanation {
        required_permission: required.as_str().to_string(),
        granted: false,
        reason: format!(
            "role {} does not grant '{}'. Current permissions: {:?}",
            principal.role, required, effective
        ),
        user_id: principal.user_id,
        role: principal.role,
        effective_permissions: effective,
        granting_roles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::EmailAddress;

    fn principal(role: Role) -> Principal {
        Principal::new(
            UserId::new(),
            EmailAddress::parse("someone@campus.edu").unwrap(),
            role,
        )
    }

    #[test]
    fn admin_wildcard_grants_anything() {
        let p = principal(Role::Admin);
        assert!(authorize(&p, &Permission::new("enrollments.create")).is_ok());
        assert!(authorize(&p, &Permission::new("audit.read")).is_ok());
    }

    #[test]
    fn professor_can_grade_but_not_delete() {
        let p = principal(Role::Professor);
        assert!(authorize(&p, &Permission::new("enrollments.grade")).is_ok());
        assert_eq!(
            authorize(&p, &Permission::new("enrollments.delete")),
            Err(AuthzError::Forbidden("enrollments.delete".to_string()))
        );
    }

    #[test]
    fn student_cannot_list_enrollments() {
        let p = principal(Role::Aluno);
        assert!(authorize(&p, &Permission::new("enrollments.read")).is_ok());
        assert!(authorize(&p, &Permission::new("enrollments.list")).is_err());
    }

    #[test]
    fn explanation_lists_granting_roles_on_denial() {
        let p = principal(Role::Aluno);
        let explanation = explain_authorization(&p, &Permission::new("enrollments.grade"));

        assert!(!explanation.granted);
        assert_eq!(explanation.granting_roles, vec![Role::Admin, Role::Professor]);
        assert!(explanation.reason.contains("ALUNO"));
    }

    #[test]
    fn explanation_reports_wildcard_grant() {
        let p = principal(Role::Admin);
        let explanation = explain_authorization(&p, &Permission::new("courses.delete"));

        assert!(explanation.granted);
        assert!(explanation.reason.contains("wildcard"));
        assert_eq!(explanation.effective_permissions, vec!["*"]);

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["role"], "ADMIN");
    }
}
