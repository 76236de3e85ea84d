//! Infrastructure layer: configuration, storage, audit log and the
//! application services that orchestrate the domain crates.

pub mod audit;
pub mod config;
pub mod services;
pub mod store;

pub use config::CampusConfig;
pub use services::{CampusServices, ServiceError, ServiceResult};
