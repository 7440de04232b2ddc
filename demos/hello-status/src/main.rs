//! # Hello Status Demo
//!
//! Serves status pages on http://127.0.0.1:8080/ with one example service
//! next to the built-in "Base" service. Ctrl-C stops the server.
//!
//! ```bash
//! cargo run --bin hello-status
//! ```

use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use statuspages::prelude::*;
use tracing_subscriber::EnvFilter;

/// Counts how often its detail page was opened.
#[derive(Default)]
struct ExampleService {
    visits: AtomicU64,
}

#[async_trait]
impl Service for ExampleService {
    async fn summary_fragment(&self, _name: &str) -> anyhow::Result<String> {
        Ok(format!(
            "<p>Example service, {} detail page visits</p>\n",
            self.visits.load(Ordering::Relaxed)
        ))
    }

    async fn render_detail_page(
        &self,
        name: &str,
        sink: &mut ResponseSink,
        _request: &StatusRequest,
    ) -> anyhow::Result<()> {
        let visits = self.visits.fetch_add(1, Ordering::Relaxed) + 1;

        let mut page = page_begin(name)?;
        page.push_str(&format!("<p>Visit number {visits}.</p>\n"));
        page.push_str(PAGE_END);

        sink.set_html();
        sink.write_str(&page);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let listener = TcpListener::bind("127.0.0.1:8080")?;
    let server = Server::builder()
        .bind_root_path()
        .listener(listener)
        .build();

    let name = server.add_service("Example", Arc::new(ExampleService::default()));
    tracing::info!(service = %name, "example service registered");

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    server.run(shutdown).await?;
    Ok(())
}
