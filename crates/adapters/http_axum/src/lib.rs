//! # maintrack-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **server-side-rendered admin pages** (sites, machines,
//!   maintenance history, backup schedules, test email, login)
//! - Accept HTML form posts, validate them through the application services
//!   and answer with a redirect (PRG pattern) plus a flash message
//! - Issue the `maintrack_session` cookie that keys the flash queue
//!
//! ## Rendering approach
//! - Every page is rendered server-side as complete HTML with askama.
//! - Failed submissions re-render the form with the submitted values and an
//!   error flash; successful ones redirect with `303 See Other`.
//! - The only script is the inline frequency toggle on the backup form; its
//!   initial state is computed on the server.
//!
//! ## Dependency rule
//! Depends on `maintrack-app` (for port traits and services) and
//! `maintrack-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod dashboard;
pub mod error;
pub mod router;
pub mod session;
pub mod state;
