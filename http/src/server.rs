//! # Server - Status Pages over HTTP
//!
//! Owns the service registry and the route table behind a single
//! reader/writer lock. Requests take the shared side just long enough to
//! resolve a route or a service; registration and handler binding take the
//! exclusive side.
//!
//! ## Lifecycle
//!
//! - `Server::builder()...build()`: routes bound, "Base" service registered
//! - `add_service` / `remove_service` / `add_handler`: any time, from any thread
//! - `run(token)`: serve until the listener fails or `token` is cancelled;
//!   a server runs at most once

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use http::Request;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use parking_lot::{Mutex, RwLock};
use statuspages_base::{BASE_SERVICE_NAME, BaseService};
use statuspages_core::{Registry, Service, StatusError, StatusRequest};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::diagnostics;
use crate::error::ServerError;
use crate::mux::{HandlerFuture, Mux, Route, RouteHandler};
use crate::response::{self, HttpResponse};
use crate::router;

/// Path the status pages are always served on.
pub const STATUS_PATH: &str = "/status";

/// Largest request body read before the request is rejected (10 MiB).
pub const MAX_BODY_BYTES: usize = 10 << 20;

const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(5);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Everything guarded by the server lock.
pub(crate) struct State {
    pub(crate) registry: Registry<dyn Service>,
    pub(crate) routes: Mux,
}

/// Status pages server.
///
/// # Example
///
/// ```rust,ignore
/// let server = Server::builder().bind_root_path().build();
/// let name = server.add_service("Cache", Arc::new(CacheStatus::new()));
/// server.run(CancellationToken::new()).await?;
/// ```
pub struct Server {
    state: Arc<RwLock<State>>,
    listener: Mutex<Option<StdTcpListener>>,
    listen_addr: Option<SocketAddr>,
    http: Arc<http1::Builder>,
    local_addr: Mutex<Option<SocketAddr>>,
    started: AtomicBool,
}

impl Server {
    /// Server on a free loopback port, status pages on `/status` only.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Register `service`, see [`Registry::add`] for how the name is chosen.
    pub fn add_service(&self, name: &str, service: Arc<dyn Service>) -> String {
        self.state.write().registry.add(name, service)
    }

    /// Unregister `service`. Returns `false` when it was not registered.
    pub fn remove_service<T: ?Sized>(&self, service: &Arc<T>) -> bool {
        self.state.write().registry.remove(service)
    }

    pub fn lookup_service(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.state.read().registry.lookup(name)
    }

    /// Registered names in index page order.
    pub fn service_names(&self) -> Vec<String> {
        self.state.read().registry.names()
    }

    /// Serve `handler` on `pattern` next to the status pages.
    ///
    /// A pattern ending in `/` covers the whole subtree below it. Binding a
    /// pattern again replaces the previous handler.
    pub fn add_handler<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(StatusRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        let handler: RouteHandler =
            Arc::new(move |req: StatusRequest| Box::pin(handler(req)) as HandlerFuture);
        self.state
            .write()
            .routes
            .insert(pattern, Route::Handler(handler));
        tracing::debug!(%pattern, "handler bound");
    }

    /// Bound route patterns, sorted.
    pub fn patterns(&self) -> Vec<String> {
        self.state.read().routes.patterns()
    }

    /// Address the server listens on, once `run` has bound it.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Route one request without a socket, exactly as `run` would.
    pub async fn handle(&self, req: StatusRequest) -> HttpResponse {
        route(&self.state, req).await
    }

    /// Accept connections until the listener fails or `shutdown` is cancelled.
    ///
    /// Cancellation is observed even if it happened before the call; the
    /// listener is dropped, open connections are asked to finish gracefully and
    /// `Ok(())` is returned. Transient accept errors (aborted connections,
    /// exhausted file descriptors) are retried with a backoff of 5ms doubling
    /// up to 1s.
    ///
    /// A server runs once: any later call returns [`ServerError::AlreadyRun`].
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRun);
        }
        let listener = self.bind().await?;
        let addr = listener.local_addr()?;
        *self.local_addr.lock() = Some(addr);
        tracing::info!("Status pages listening on http://{}{}", addr, STATUS_PATH);

        let mut backoff = None;
        loop {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => accepted,
            };
            let (stream, peer) = match accepted {
                Ok(conn) => {
                    backoff = None;
                    conn
                }
                Err(err) if is_fatal_accept_error(&err) => {
                    tracing::error!(%addr, error = %err, "Status pages listener failed");
                    return Err(err.into());
                }
                Err(err) => {
                    let delay = next_backoff(backoff);
                    backoff = Some(delay);
                    tracing::warn!(error = %err, ?delay, "accept failed, retrying");
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => continue,
                    }
                }
            };
            let io = TokioIo::new(stream);
            let state = Arc::clone(&self.state);
            let http = Arc::clone(&self.http);
            let shutdown = shutdown.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let state = Arc::clone(&state);
                    async move { Ok::<_, Infallible>(serve_incoming(state, req).await) }
                });

                let conn = http.serve_connection(io, service);
                tokio::pin!(conn);
                let mut draining = false;
                loop {
                    tokio::select! {
                        result = conn.as_mut() => {
                            // The client is gone either way; nothing left to answer.
                            if let Err(err) = result {
                                tracing::debug!(%peer, error = ?err, "connection closed with error");
                            }
                            break;
                        }
                        _ = shutdown.cancelled(), if !draining => {
                            draining = true;
                            conn.as_mut().graceful_shutdown();
                        }
                    }
                }
            });
        }

        tracing::info!(%addr, "Status pages server closed");
        Ok(())
    }

    async fn bind(&self) -> Result<TcpListener, ServerError> {
        let supplied = self.listener.lock().take();
        let listener = match supplied {
            Some(listener) => {
                listener.set_nonblocking(true)?;
                TcpListener::from_std(listener)?
            }
            None => {
                let addr = self
                    .listen_addr
                    .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, 0)));
                TcpListener::bind(addr).await?
            }
        };
        Ok(listener)
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Server`].
#[derive(Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    listener: Option<StdTcpListener>,
    http: Option<http1::Builder>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from `config`; later builder calls still apply on top.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve on an already bound listener instead of binding one.
    pub fn listener(mut self, listener: StdTcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Also serve the status pages on `/`.
    ///
    /// Meant for servers dedicated to status pages; every path nothing else
    /// claims ends up on the index page.
    pub fn bind_root_path(mut self) -> Self {
        self.config.bind_root_path = true;
        self
    }

    /// HTTP/1 connection settings to serve with.
    pub fn http1(mut self, http: http1::Builder) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Server {
        let mut routes = Mux::new();
        routes.insert(STATUS_PATH, Route::Status);
        if self.config.bind_root_path {
            routes.insert("/", Route::Status);
        }
        for (pattern, route) in diagnostics::routes() {
            routes.insert(pattern, route);
        }

        let mut registry: Registry<dyn Service> = Registry::new();
        registry.add(BASE_SERVICE_NAME, Arc::new(BaseService::new()));

        Server {
            state: Arc::new(RwLock::new(State { registry, routes })),
            listener: Mutex::new(self.listener),
            listen_addr: self.config.listen_addr,
            http: Arc::new(self.http.unwrap_or_else(default_http1)),
            local_addr: Mutex::new(None),
            started: AtomicBool::new(false),
        }
    }
}

fn default_http1() -> http1::Builder {
    let mut http = http1::Builder::new();
    http.timer(TokioTimer::new());
    http
}

/// Errors after which the listener cannot accept again.
fn is_fatal_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::NotConnected | io::ErrorKind::Unsupported
    )
}

fn next_backoff(previous: Option<Duration>) -> Duration {
    match previous {
        None => ACCEPT_BACKOFF_MIN,
        Some(delay) => (delay * 2).min(ACCEPT_BACKOFF_MAX),
    }
}

/// Read a whole request body, refusing anything over [`MAX_BODY_BYTES`].
async fn collect_body<B>(body: B) -> Result<Bytes, StatusError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let too_large =
        || StatusError::Request(format!("request body larger than {MAX_BODY_BYTES} bytes"));
    if body.size_hint().lower() > MAX_BODY_BYTES as u64 {
        return Err(too_large());
    }
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.is::<http_body_util::LengthLimitError>() => Err(too_large()),
        Err(err) => Err(StatusError::Request(err.to_string())),
    }
}

async fn route(state: &RwLock<State>, req: StatusRequest) -> HttpResponse {
    let route = state.read().routes.resolve(req.uri().path());
    match route {
        Some(Route::Status) => router::serve_status(state, req).await,
        Some(Route::Handler(handler)) => handler(req).await,
        None => response::not_found(),
    }
}

async fn serve_incoming(state: Arc<RwLock<State>>, req: Request<Incoming>) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "StatusRequest",
        statuspages.http.method = %req.method(),
        statuspages.http.path = %req.uri().path(),
        statuspages.http.request_id = %request_id
    );

    async move {
        let (parts, body) = req.into_parts();
        let body = match collect_body(body).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, "request body rejected");
                return response::error_page(&err);
            }
        };

        let res = route(&state, Request::from_parts(parts, body)).await;
        tracing::debug!(status = %res.status(), "request served");
        res
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_server_registers_base_service_once() {
        let server = Server::new();
        assert_eq!(server.service_names(), vec![BASE_SERVICE_NAME]);
        assert!(server.lookup_service(BASE_SERVICE_NAME).is_some());
    }

    #[test]
    fn base_name_collides_like_any_other() {
        let server = Server::new();
        let name = server.add_service(BASE_SERVICE_NAME, Arc::new(BaseService::new()));
        assert_eq!(name, "Base2");
    }

    #[test]
    fn root_binding_is_opt_in() {
        assert_eq!(
            Server::new().patterns(),
            vec!["/pprof", "/pprof/", "/pprof/cmdline", "/status"]
        );
        let rooted = Server::builder().bind_root_path().build();
        assert_eq!(
            rooted.patterns(),
            vec!["/", "/pprof", "/pprof/", "/pprof/cmdline", "/status"]
        );
    }

    #[test]
    fn config_is_applied() {
        let config = ServerConfig {
            listen_addr: None,
            bind_root_path: true,
        };
        assert!(Server::from_config(config).patterns().contains(&"/".to_string()));
    }

    #[tokio::test]
    async fn cancelled_token_stops_run_before_serving() {
        let server = Server::new();
        let token = CancellationToken::new();
        token.cancel();

        server.run(token).await.unwrap();
        assert!(server.local_addr().is_some());
    }

    #[tokio::test]
    async fn body_within_limit_is_collected() {
        let body = http_body_util::Full::new(Bytes::from_static(b"service=x"));
        assert_eq!(collect_body(body).await.unwrap(), "service=x");

        let exact = http_body_util::Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES]));
        assert_eq!(collect_body(exact).await.unwrap().len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let body = http_body_util::Full::new(Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1]));
        let err = collect_body(body).await.unwrap_err();
        assert!(matches!(err, StatusError::Request(_)));
        assert!(err.to_string().contains("larger than"));
    }

    #[test]
    fn transient_accept_errors_are_retried() {
        for kind in [
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::Interrupted,
            io::ErrorKind::OutOfMemory,
        ] {
            assert!(!is_fatal_accept_error(&io::Error::from(kind)), "{kind:?}");
        }
        // EMFILE: too many open files.
        assert!(!is_fatal_accept_error(&io::Error::from_raw_os_error(24)));
        assert!(is_fatal_accept_error(&io::Error::from(io::ErrorKind::InvalidInput)));
    }

    #[test]
    fn accept_backoff_doubles_up_to_a_second() {
        let mut delay = next_backoff(None);
        assert_eq!(delay, Duration::from_millis(5));
        delay = next_backoff(Some(delay));
        assert_eq!(delay, Duration::from_millis(10));
        for _ in 0..20 {
            delay = next_backoff(Some(delay));
        }
        assert_eq!(delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn server_runs_only_once() {
        let server = Server::new();
        let token = CancellationToken::new();
        token.cancel();
        server.run(token).await.unwrap();
        let addr = server.local_addr();

        let err = server.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyRun));
        assert_eq!(server.local_addr(), addr);
    }
}
