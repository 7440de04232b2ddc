//! # Service - The Status Page Contract
//!
//! Every subsystem that wants a place on the status pages implements
//! [`Service`]: one snippet for the shared index page and full control of its
//! own detail page.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Request, StatusCode};

/// Inbound request handed to detail pages, body already collected.
pub type StatusRequest = Request<Bytes>;

#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// HTML snippet placed under this service's heading on the index page.
    ///
    /// The snippet is inserted verbatim; escaping its content is up to the service.
    async fn summary_fragment(&self, name: &str) -> anyhow::Result<String>;

    /// Produce the whole detail page for this service: status, headers and body.
    ///
    /// `name` is the name the request asked for.
    async fn render_detail_page(
        &self,
        name: &str,
        sink: &mut ResponseSink,
        request: &StatusRequest,
    ) -> anyhow::Result<()>;
}

/// Buffered response a detail page writes into.
///
/// Nothing reaches the client until the handler returned `Ok`, so a failing
/// handler never leaves a half-written page behind.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replace any previous value of `name`.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Shorthand for the `text/html; charset=utf-8` content type.
    pub fn set_html(&mut self) {
        self.set_header(
            CONTENT_TYPE,
            HeaderValue::from_static(crate::render::HTML_CONTENT_TYPE),
        );
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body.freeze())
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Write for ResponseSink {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        ResponseSink::write_str(self, s);
        Ok(())
    }
}
