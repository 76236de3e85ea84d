use chrono::{Duration, Utc};

use campus_auth::Principal;

use super::Stores;
use super::error::{ServiceResult, require};
use crate::audit::{AuditEntry, AuditLevel};

const RECENT_WINDOW_HOURS: i64 = 24;

/// Read access to the audit log for administrators.
#[derive(Debug, Clone)]
pub struct AuditQueryService {
    stores: Stores,
}

impl AuditQueryService {
    pub(crate) fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn all(&self, principal: &Principal) -> ServiceResult<Vec<AuditEntry>> {
        require(principal, "audit.read")?;
        Ok(self.stores.audit_log.all())
    }

    pub fn by_level(&self, principal: &Principal, level: AuditLevel) -> ServiceResult<Vec<AuditEntry>> {
        require(principal, "audit.read")?;
        Ok(self.stores.audit_log.by_level(level))
    }

    /// Entries written on behalf of `user` (an account email or `system`).
    pub fn by_user(&self, principal: &Principal, user: &str) -> ServiceResult<Vec<AuditEntry>> {
        require(principal, "audit.read")?;
        Ok(self.stores.audit_log.by_user(user.trim()))
    }

    /// Entries of the last 24 hours.
    pub fn recent(&self, principal: &Principal) -> ServiceResult<Vec<AuditEntry>> {
        require(principal, "audit.read")?;
        let from = Utc::now() - Duration::hours(RECENT_WINDOW_HOURS);
        Ok(self.stores.audit_log.since(from))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::CampusServices;
    use super::super::testing::{add_professor, campus, professor_principal};
    use super::*;

    #[test]
    fn recent_skips_old_entries() {
        let stores = Stores::in_memory(100);
        let services = CampusServices::new(stores.clone());
        let admin = services
            .bootstrap_admin("admin@campus.edu")
            .unwrap()
            .principal();
        stores.audit_sink.record(AuditEntry {
            timestamp: Utc::now() - Duration::hours(48),
            level: AuditLevel::Info,
            message: "old".to_string(),
            component: "test".to_string(),
            method: "seed".to_string(),
            user: "system".to_string(),
            operation: "test.seed".to_string(),
            metadata: json!({}),
        });

        let all = services.audit.all(&admin).unwrap();
        let recent = services.audit.recent(&admin).unwrap();
        assert_eq!(all.len(), recent.len() + 1);
        assert!(recent.iter().all(|e| e.message != "old"));
    }

    #[test]
    fn only_admins_read_the_log() {
        let (services, admin) = campus();
        let professor = professor_principal(&services, add_professor(&services, &admin, 1));

        assert!(services.audit.all(&professor).unwrap_err().is_forbidden());
        assert!(services.audit.recent(&professor).unwrap_err().is_forbidden());

        let by_admin = services.audit.by_user(&admin, "admin@campus.edu").unwrap();
        assert_eq!(by_admin.len(), 1);
        assert_eq!(by_admin[0].operation, "professor.create");
    }
}
