use thiserror::Error;

use campus_auth::{AuthzError, Permission, Principal, authorize, explain_authorization};
use campus_core::DomainError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of an application service call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ServiceError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_conflict())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(DomainError::Validation(_)))
    }
}

/// Authorize `principal` for the named permission, logging denials with the
/// policy's explanation.
pub(crate) fn require(principal: &Principal, permission: &'static str) -> ServiceResult<()> {
    let required = Permission::from_static(permission);
    authorize(principal, &required).map_err(|err| {
        let explanation = explain_authorization(principal, &required);
        tracing::warn!(
            user = %principal.email,
            role = %principal.role,
            permission,
            granting_roles = ?explanation.granting_roles,
            reason = %explanation.reason,
            "permission denied"
        );
        ServiceError::from(err)
    })
}

#[cfg(test)]
mod tests {
    use campus_auth::Role;
    use campus_core::{EmailAddress, UserId};

    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(
            UserId::new(),
            EmailAddress::parse("someone@campus.edu").unwrap(),
            role,
        )
    }

    #[test]
    fn require_maps_denial_to_forbidden() {
        assert!(require(&principal(Role::Professor), "enrollments.grade").is_ok());

        let err = require(&principal(Role::Aluno), "enrollments.grade").unwrap_err();
        assert_eq!(
            err,
            ServiceError::Forbidden(AuthzError::Forbidden("enrollments.grade".to_string()))
        );
        assert!(err.is_forbidden());
    }
}
