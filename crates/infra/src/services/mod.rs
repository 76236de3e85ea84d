//! Application services.
//!
//! Every operation takes the acting [`Principal`](campus_auth::Principal)
//! first, checks its permission, then talks to the stores. Services are
//! synchronous and cheap to clone; all state lives behind the shared stores.

mod accounts;
mod audit_log;
mod courses;
mod enrollments;
mod error;
mod professors;
mod students;

use std::sync::Arc;

use campus_auth::UserAccount;
use campus_core::{CourseId, ProfessorId, StudentId, UserId};
use campus_courses::Course;
use campus_people::{Professor, Student};

use crate::audit::{AuditLog, AuditSink, InMemoryAuditLog};
use crate::config::CampusConfig;
use crate::store::{EnrollmentRepository, InMemoryEnrollmentRepository, InMemoryRecordStore, RecordStore};

pub use accounts::UserService;
pub use audit_log::AuditQueryService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use error::{ServiceError, ServiceResult};
pub use professors::ProfessorService;
pub use students::StudentService;

/// Storage handles shared by all services.
#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn RecordStore<StudentId, Student>>,
    pub professors: Arc<dyn RecordStore<ProfessorId, Professor>>,
    pub courses: Arc<dyn RecordStore<CourseId, Course>>,
    pub accounts: Arc<dyn RecordStore<UserId, UserAccount>>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub audit_sink: Arc<dyn AuditSink>,
    pub audit_log: Arc<dyn AuditLog>,
}

impl Stores {
    pub fn in_memory(audit_capacity: usize) -> Self {
        let audit = Arc::new(InMemoryAuditLog::new(audit_capacity));
        Self {
            students: Arc::new(InMemoryRecordStore::<StudentId, Student>::new()),
            professors: Arc::new(InMemoryRecordStore::<ProfessorId, Professor>::new()),
            courses: Arc::new(InMemoryRecordStore::<CourseId, Course>::new()),
            accounts: Arc::new(InMemoryRecordStore::<UserId, UserAccount>::new()),
            enrollments: Arc::new(InMemoryEnrollmentRepository::new()),
            audit_sink: audit.clone(),
            audit_log: audit,
        }
    }
}

impl core::fmt::Debug for Stores {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

/// Wiring for the whole application layer.
#[derive(Debug, Clone)]
pub struct CampusServices {
    pub enrollments: EnrollmentService,
    pub students: StudentService,
    pub professors: ProfessorService,
    pub courses: CourseService,
    pub users: UserService,
    pub audit: AuditQueryService,
}

impl CampusServices {
    pub fn new(stores: Stores) -> Self {
        Self {
            enrollments: EnrollmentService::new(stores.clone()),
            students: StudentService::new(stores.clone()),
            professors: ProfessorService::new(stores.clone()),
            courses: CourseService::new(stores.clone()),
            users: UserService::new(stores.clone()),
            audit: AuditQueryService::new(stores),
        }
    }

    pub fn in_memory(config: &CampusConfig) -> Self {
        tracing::info!(audit_capacity = config.audit_capacity, "wiring in-memory services");
        Self::new(Stores::in_memory(config.audit_capacity))
    }

    /// Read [`CampusConfig`] from the environment, initialise logging with it
    /// and wire in-memory services.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(CampusConfig::from_env()?)
    }

    /// Like [`CampusServices::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_config(CampusConfig::from_lookup(lookup)?)
    }

    fn from_config(config: CampusConfig) -> anyhow::Result<Self> {
        campus_observability::init(&config.log);
        Ok(Self::in_memory(&config))
    }

    /// Create the first administrator. No principal is required.
    pub fn bootstrap_admin(&self, email: &str) -> ServiceResult<UserAccount> {
        self.users.bootstrap_admin(email)
    }
}
