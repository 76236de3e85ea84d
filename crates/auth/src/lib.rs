//! `campus-auth`: pure authorization boundary.
//!
//! Roles, permissions and user accounts. Decoupled from transport and storage:
//! callers resolve a [`Principal`] and pass it explicitly to every operation.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod user;

pub use authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
pub use permissions::{Permission, permissions_for};
pub use principal::Principal;
pub use roles::Role;
pub use user::{AccountProfile, NewUserAccount, UserAccount};
