use serde::{Deserialize, Serialize};

use campus_core::{EmailAddress, UserId};

use crate::{Permission, Role, permissions_for};

/// The authenticated actor of a service call.
///
/// Always passed explicitly; nothing in the workspace reads a "current user"
/// from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, email: EmailAddress, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    /// Effective permissions granted by the principal's role.
    pub fn permissions(&self) -> Vec<Permission> {
        permissions_for(self.role)
    }
}
