//! # maintrack-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SiteRepository`, `MachineRepository`, `UserRepository`: CRUD
//!   - `MaintenanceRepository`: parts and the append-only maintenance log
//!   - `BackupScheduleRepository`: CRUD for backup schedules
//!   - `SessionStore`: per-session flash queue and logged-in user
//!   - `Mailer`: outgoing email delivery
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SiteService`, `MachineService`, `MaintenanceService`,
//!     `BackupService`, `AuthService`, `EmailService`
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (session store, logging mailer)
//!
//! ## Dependency rule
//! Depends on `maintrack-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod mailer;
pub mod ports;
pub mod services;
pub mod session;
