#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use http_body_util::BodyExt;
use statuspages_core::{ResponseSink, Service, StatusRequest};
use statuspages_http::HttpResponse;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Service that counts calls and echoes the name it was called with.
#[derive(Default)]
pub struct MockService {
    summaries: AtomicUsize,
    details: AtomicUsize,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> usize {
        self.summaries.load(Ordering::SeqCst)
    }

    pub fn details(&self) -> usize {
        self.details.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for MockService {
    async fn summary_fragment(&self, name: &str) -> anyhow::Result<String> {
        self.summaries.fetch_add(1, Ordering::SeqCst);
        Ok(format!("<p class=\"mock\">{name} service</p>\n"))
    }

    async fn render_detail_page(
        &self,
        name: &str,
        sink: &mut ResponseSink,
        _request: &StatusRequest,
    ) -> anyhow::Result<()> {
        self.details.fetch_add(1, Ordering::SeqCst);
        sink.set_html();
        sink.write_str(&format!("{name} service status page"));
        Ok(())
    }
}

/// Service whose operations always fail, after writing part of a page.
pub struct FailingService;

#[async_trait]
impl Service for FailingService {
    async fn summary_fragment(&self, _name: &str) -> anyhow::Result<String> {
        Err(anyhow!("summary <broken>"))
    }

    async fn render_detail_page(
        &self,
        _name: &str,
        sink: &mut ResponseSink,
        _request: &StatusRequest,
    ) -> anyhow::Result<()> {
        sink.write_str("half written");
        Err(anyhow!("detail <broken>"))
    }
}

/// Detail page that reads a submitted form, like a page with a settings button.
pub struct FormService;

#[async_trait]
impl Service for FormService {
    async fn summary_fragment(&self, _name: &str) -> anyhow::Result<String> {
        Ok(String::from("<form method=\"post\"></form>"))
    }

    async fn render_detail_page(
        &self,
        name: &str,
        sink: &mut ResponseSink,
        request: &StatusRequest,
    ) -> anyhow::Result<()> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(request.body())?;
        let value = fields
            .into_iter()
            .find(|(key, _)| key == "value")
            .map(|(_, value)| value)
            .unwrap_or_default();
        sink.write_str(&format!("{name} {} {value}", request.method()));
        Ok(())
    }
}

pub fn get(uri: &str) -> StatusRequest {
    Request::get(uri).body(Bytes::new()).unwrap()
}

pub fn post_form(uri: &str, body: &'static str) -> StatusRequest {
    Request::post(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap()
}

pub async fn body_text(res: HttpResponse) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Minimal HTTP/1.1 exchange over a fresh connection: `(status, headers, body)`.
pub async fn http_exchange(addr: SocketAddr, request: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, head.to_string(), body.to_string())
}

pub async fn http_get(addr: SocketAddr, path: &str) -> (u16, String, String) {
    http_exchange(
        addr,
        &format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
    )
    .await
}
