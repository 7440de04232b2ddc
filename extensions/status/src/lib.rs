//! # statuspages-base
//!
//! The service every status page server starts with: process name, current
//! and start time, uptime, command line and environment.

mod base;
mod templates;

pub use base::{BASE_SERVICE_NAME, BaseService};
pub use templates::TIMESTAMP_FORMAT;
