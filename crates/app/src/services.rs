//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod auth_service;
pub mod backup_service;
pub mod email_service;
pub mod machine_service;
pub mod maintenance_service;
pub mod site_service;

#[cfg(test)]
pub(crate) mod testing;
