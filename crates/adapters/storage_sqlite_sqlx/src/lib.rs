//! # maintrack-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `maintrack-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run the embedded migrations in `migrations/`
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `maintrack-app` (for port traits) and `maintrack-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod backup_repo;
mod error;
mod machine_repo;
mod maintenance_repo;
mod pool;
mod site_repo;
mod user_repo;

pub use backup_repo::SqliteBackupScheduleRepository;
pub use error::StorageError;
pub use machine_repo::SqliteMachineRepository;
pub use maintenance_repo::SqliteMaintenanceRepository;
pub use pool::{Config, Database};
pub use site_repo::SqliteSiteRepository;
pub use user_repo::SqliteUserRepository;
