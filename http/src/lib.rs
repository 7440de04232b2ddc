//! # statuspages-http
//!
//! Serves the status pages: an index page aggregating every registered
//! service and one detail page per service, on `/status` (and optionally `/`),
//! next to a few process diagnostics under `/pprof/`.
//!
//! ## API Surface
//!
//! - `Server::builder()` — listener, root binding, HTTP/1 settings
//! - `add_service` / `remove_service` — registry of [`Service`]s
//! - `add_handler(pattern, handler)` — extra routes on the same listener
//! - `run(token)` — serve until cancelled
//! - `handle(request)` — route one request in-process

pub mod config;
pub mod diagnostics;
pub mod error;
mod mux;
pub mod response;
mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use mux::{HandlerFuture, RouteHandler};
pub use response::HttpResponse;
pub use router::{SERVICE_PARAM, requested_service};
pub use server::{MAX_BODY_BYTES, STATUS_PATH, Server, ServerBuilder};
pub use statuspages_core::Service;
pub use tokio_util::sync::CancellationToken;
