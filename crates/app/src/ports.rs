//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod mailer;
pub mod session;
pub mod storage;

pub use mailer::{Mailer, OutgoingEmail};
pub use session::SessionStore;
pub use storage::{
    BackupScheduleRepository, MachineRepository, MaintenanceRepository, SiteRepository,
    UserRepository,
};
