//! # maintrack-domain
//!
//! Pure domain model for the maintrack maintenance tracker.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Sites** (facilities grouping machines and authorized users)
//! - Define **Machines** (equipment tracked for maintenance)
//! - Define **Maintenance logs** and **parts** (immutable audit records)
//! - Define **Backup schedules** (recurrence, retention policy)
//! - Define **Test emails** and **flash messages**
//! - Contain all invariant enforcement and form-value validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod backup;
pub mod email;
pub mod flash;
pub mod machine;
pub mod maintenance;
pub mod notification;
pub mod site;
pub mod user;
