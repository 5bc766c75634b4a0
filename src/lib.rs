//! Library crate for roster-admin.
//!
//! This crate exposes the building blocks of the admin console:
//! - Wire types for users, courses and enrollments (`model`)
//! - The admin HTTP API and operator credentials (`api`)
//! - Console state, key handling and request dispatch (`app`)
//! - Configuration from CLI, environment and `console.conf` (`config`)
//! - Paging/search query and enrollment eligibility rules (`search`, `enrollment`)
//! - Transient operator notifications (`notify`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `roster-admin` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod model;
pub mod notify;
pub mod search;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
