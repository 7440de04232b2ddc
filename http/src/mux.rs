//! Route table.
//!
//! A pattern without a trailing `/` matches one path exactly. A pattern ending
//! in `/` matches every path below it, so `/` matches everything. The longest
//! matching pattern wins.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use statuspages_core::StatusRequest;

use crate::response::HttpResponse;

/// Boxed future produced by a route handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HttpResponse> + Send>>;

/// Handler registered next to the status pages.
pub type RouteHandler = Arc<dyn Fn(StatusRequest) -> HandlerFuture + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Route {
    /// The status index and detail pages.
    Status,
    Handler(RouteHandler),
}

#[derive(Default)]
pub(crate) struct Mux {
    exact: HashMap<String, Route>,
    subtrees: HashMap<String, Route>,
}

impl Mux {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind `pattern`, replacing whatever it was bound to before.
    pub(crate) fn insert(&mut self, pattern: impl Into<String>, route: Route) {
        let pattern = pattern.into();
        if pattern.ends_with('/') {
            self.subtrees.insert(pattern, route);
        } else {
            self.exact.insert(pattern, route);
        }
    }

    pub(crate) fn resolve(&self, path: &str) -> Option<Route> {
        if let Some(route) = self.exact.get(path) {
            return Some(route.clone());
        }
        self.subtrees
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, route)| route.clone())
    }

    pub(crate) fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self
            .exact
            .keys()
            .chain(self.subtrees.keys())
            .cloned()
            .collect();
        patterns.sort();
        patterns
    }
}
