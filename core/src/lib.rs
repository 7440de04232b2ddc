//! # statuspages-core
//!
//! The pieces of the status pages that do not depend on a running server:
//! the [`Service`] contract, the [`Registry`] of named services and the
//! shared page fragments.

pub mod error;
pub mod registry;
pub mod render;
pub mod service;

pub use error::{StatusError, StatusResult};
pub use registry::{DEFAULT_SERVICE_NAME, Registry};
pub use render::{HTML_CONTENT_TYPE, INDEX_TITLE, PAGE_END, page_begin, service_entry};
pub use service::{ResponseSink, Service, StatusRequest};

pub mod prelude {
    pub use crate::error::{StatusError, StatusResult};
    pub use crate::render::{PAGE_END, page_begin};
    pub use crate::service::{ResponseSink, Service, StatusRequest};
    pub use async_trait::async_trait;
}
