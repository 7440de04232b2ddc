//! # statuspages
//!
//! Status pages for a running process. Subsystems implement [`Service`],
//! register with a [`Server`] and get an entry on the shared index page plus a
//! detail page of their own.
//!
//! # Example
//! ```no_run
//! use statuspages::prelude::*;
//!
//! struct Queue;
//!
//! #[async_trait]
//! impl Service for Queue {
//!     async fn summary_fragment(&self, _name: &str) -> anyhow::Result<String> {
//!         Ok("<p>3 jobs waiting</p>".to_string())
//!     }
//!
//!     async fn render_detail_page(
//!         &self,
//!         name: &str,
//!         sink: &mut ResponseSink,
//!         _request: &StatusRequest,
//!     ) -> anyhow::Result<()> {
//!         let mut page = page_begin(name)?;
//!         page.push_str(PAGE_END);
//!         sink.set_html();
//!         sink.write_str(&page);
//!         Ok(())
//!     }
//! }
//!
//! # async fn start() -> Result<(), ServerError> {
//! let server = Server::builder().bind_root_path().build();
//! server.add_service("Queue", std::sync::Arc::new(Queue));
//! server.run(CancellationToken::new()).await
//! # }
//! ```

pub use statuspages_base::BaseService;
pub use statuspages_core::{
    PAGE_END, Registry, ResponseSink, Service, StatusError, StatusRequest, page_begin,
};
pub use statuspages_http::{
    CancellationToken, MAX_BODY_BYTES, STATUS_PATH, Server, ServerBuilder, ServerConfig,
    ServerError,
};

pub use statuspages_http::response;

pub mod prelude {
    pub use statuspages_base::BaseService;
    pub use statuspages_core::prelude::*;
    pub use statuspages_http::response::{self, HttpResponse};
    pub use statuspages_http::{CancellationToken, Server, ServerConfig, ServerError};
}
