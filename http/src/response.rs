use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use http::StatusCode;
use http_body_util::Full;
use hyper::Response;
use statuspages_core::{HTML_CONTENT_TYPE, ResponseSink, StatusError, render};

pub type HttpResponse = Response<Full<Bytes>>;

/// Create a text/plain response
pub fn text(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    with_content_type(status, "text/plain; charset=utf-8", body.into())
}

/// Create a text/html response
pub fn html(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    with_content_type(status, HTML_CONTENT_TYPE, body.into())
}

/// Create a 404 Not Found response
pub fn not_found() -> HttpResponse {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}

/// Create a 301 Moved Permanently response
pub fn moved_permanently(location: &str) -> HttpResponse {
    let mut res = text(StatusCode::MOVED_PERMANENTLY, "Moved Permanently\n");
    if let Ok(value) = HeaderValue::from_str(location) {
        res.headers_mut().insert(LOCATION, value);
    }
    res
}

/// Error page for a failed status response: the message, HTML-escaped, with a 500.
pub fn error_page(err: &StatusError) -> HttpResponse {
    let body = render::error_body(&err.to_string())
        .unwrap_or_else(|_| "internal status page error".to_string());
    html(StatusCode::INTERNAL_SERVER_ERROR, body)
}

/// Turn what a detail page wrote into a response.
pub fn from_sink(sink: ResponseSink) -> HttpResponse {
    let (status, headers, body) = sink.into_parts();
    let mut res = Response::new(Full::new(body));
    *res.status_mut() = status;
    *res.headers_mut() = headers;
    res
}

fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> HttpResponse {
    let mut res = Response::new(Full::new(body));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    res
}
