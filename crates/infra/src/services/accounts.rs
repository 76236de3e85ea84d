use chrono::Utc;
use serde_json::json;

use campus_auth::{AccountProfile, NewUserAccount, Principal, Role, UserAccount};
use campus_core::{DomainError, DomainResult, EmailAddress, ProfessorId, StudentId, UserId};

use super::Stores;
use super::error::{ServiceResult, require};
use crate::audit::Auditor;
use crate::store::RecordStore;

const SYSTEM_USER: &str = "system";

/// Account administration and principal resolution.
#[derive(Debug, Clone)]
pub struct UserService {
    stores: Stores,
    audit: Auditor,
}

impl UserService {
    pub(crate) fn new(stores: Stores) -> Self {
        let audit = Auditor::new("users", stores.audit_sink.clone());
        Self { stores, audit }
    }

    #[tracing::instrument(skip_all, fields(email = %email))]
    pub fn create_admin(&self, principal: &Principal, email: &str) -> ServiceResult<UserAccount> {
        require(principal, "users.create_admin")?;
        self.register_admin(principal.email.as_str(), email)
    }

    #[tracing::instrument(skip_all, fields(email = %email))]
    pub(crate) fn bootstrap_admin(&self, email: &str) -> ServiceResult<UserAccount> {
        self.register_admin(SYSTEM_USER, email)
    }

    fn register_admin(&self, actor: &str, email: &str) -> ServiceResult<UserAccount> {
        let result = EmailAddress::parse(email).and_then(|email| {
            ensure_email_available(self.stores.accounts.as_ref(), &email, None)?;
            let account = UserAccount::create(
                UserId::new(),
                NewUserAccount {
                    email,
                    role: Role::Admin,
                    profile: AccountProfile::None,
                },
                Utc::now(),
            )?;
            self.stores.accounts.upsert(account.id, account.clone());
            Ok(account)
        });

        match &result {
            Ok(account) => self.audit.info(
                "create_admin",
                actor,
                "user.create_admin",
                format!("administrator {} created", account.email),
                json!({ "user_id": account.id }),
            ),
            Err(err) => self.audit.error(
                "create_admin",
                actor,
                "user.create_admin.error",
                format!("failed to create administrator: {err}"),
                json!({ "email": email, "error": err.to_string() }),
            ),
        }

        Ok(result?)
    }

    /// Resolve the principal of a stored account.
    pub fn principal_for(&self, user_id: UserId) -> ServiceResult<Principal> {
        let account = self
            .stores
            .accounts
            .get(&user_id)
            .ok_or_else(|| DomainError::not_found("user account"))?;
        Ok(account.principal())
    }

    pub fn principal_for_email(&self, email: &str) -> ServiceResult<Principal> {
        let email = EmailAddress::parse(email)?;
        self.find_principal(&|a| a.email == email)
    }

    pub fn principal_for_student(&self, student_id: StudentId) -> ServiceResult<Principal> {
        self.find_principal(&|a| a.student_id() == Some(student_id))
    }

    pub fn principal_for_professor(&self, professor_id: ProfessorId) -> ServiceResult<Principal> {
        self.find_principal(&|a| a.professor_id() == Some(professor_id))
    }

    fn find_principal(&self, predicate: &dyn Fn(&UserAccount) -> bool) -> ServiceResult<Principal> {
        self.stores
            .accounts
            .find(predicate)
            .map(|account| account.principal())
            .ok_or_else(|| DomainError::not_found("user account").into())
    }
}

/// Fail with `Conflict` when another account already uses `email`.
pub(crate) fn ensure_email_available(
    accounts: &dyn RecordStore<UserId, UserAccount>,
    email: &EmailAddress,
    except: Option<UserId>,
) -> DomainResult<()> {
    if accounts.any(&|a| a.email == *email && Some(a.id) != except) {
        return Err(DomainError::conflict(format!("email {email} is already in use")));
    }
    Ok(())
}

/// Create the account linked to a newly registered profile.
pub(crate) fn open_profile_account(
    accounts: &dyn RecordStore<UserId, UserAccount>,
    email: EmailAddress,
    role: Role,
    profile: AccountProfile,
) -> DomainResult<UserAccount> {
    let account = UserAccount::create(
        UserId::new(),
        NewUserAccount {
            email,
            role,
            profile,
        },
        Utc::now(),
    )?;
    accounts.upsert(account.id, account.clone());
    Ok(account)
}

/// Keep a profile's account email in step with the profile.
pub(crate) fn sync_profile_email(
    accounts: &dyn RecordStore<UserId, UserAccount>,
    profile: AccountProfile,
    email: &EmailAddress,
) {
    if let Some(mut account) = accounts.find(&|a| a.profile == profile) {
        if account.email != *email {
            account.email = email.clone();
            accounts.upsert(account.id, account);
        }
    }
}

pub(crate) fn remove_profile_account(
    accounts: &dyn RecordStore<UserId, UserAccount>,
    profile: AccountProfile,
) {
    if let Some(account) = accounts.find(&|a| a.profile == profile) {
        accounts.remove(&account.id);
    }
}

pub(crate) fn profile_account_id(
    accounts: &dyn RecordStore<UserId, UserAccount>,
    profile: AccountProfile,
) -> Option<UserId> {
    accounts.find(&|a| a.profile == profile).map(|a| a.id)
}
