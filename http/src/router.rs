//! # Router - Index Aggregation and Detail Dispatch
//!
//! One entry point, two pages, told apart by the `service` parameter:
//!
//! - absent or empty: the index page, one entry per registered service in
//!   registration order, each followed by that service's summary snippet
//! - present: the detail page of the service registered under that name
//!
//! The registry lock is only held long enough to snapshot the services or
//! resolve a name. Service code always runs with the lock released, so a slow
//! service holds up its own request and nothing else.

use http::header::CONTENT_TYPE;
use http::{Method, StatusCode};
use parking_lot::RwLock;
use statuspages_core::{
    INDEX_TITLE, PAGE_END, ResponseSink, StatusError, StatusRequest, StatusResult, render,
};

use crate::response::{self, HttpResponse};
use crate::server::State;

/// Name of the request parameter selecting a detail page.
pub const SERVICE_PARAM: &str = "service";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Serve one status request; failures become an escaped 500 page.
pub(crate) async fn serve_status(state: &RwLock<State>, req: StatusRequest) -> HttpResponse {
    match dispatch(state, &req).await {
        Ok(res) => res,
        Err(err) => {
            tracing::warn!(error = %err, "status page failed");
            response::error_page(&err)
        }
    }
}

async fn dispatch(state: &RwLock<State>, req: &StatusRequest) -> StatusResult<HttpResponse> {
    match requested_service(req)? {
        Some(name) => detail_page(state, &name, req).await,
        None => index_page(state).await,
    }
}

/// The `service` parameter of `req`, `None` when absent or empty.
///
/// GET and HEAD read the query string. POST reads a urlencoded form body first
/// and falls back to the query string. Other methods always get the index.
pub fn requested_service(req: &StatusRequest) -> StatusResult<Option<String>> {
    let query = req.uri().query().unwrap_or_default().as_bytes();
    let name = match *req.method() {
        Method::GET | Method::HEAD => first_param(query)?,
        Method::POST => {
            let from_form = if is_form(req) {
                first_param(req.body())?
            } else {
                None
            };
            match from_form {
                Some(name) => Some(name),
                None => first_param(query)?,
            }
        }
        _ => None,
    };
    Ok(name.filter(|name| !name.is_empty()))
}

fn first_param(encoded: &[u8]) -> StatusResult<Option<String>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(encoded)
        .map_err(|err| StatusError::Request(err.to_string()))?;
    Ok(pairs
        .into_iter()
        .find(|(key, _)| key == SERVICE_PARAM)
        .map(|(_, value)| value))
}

fn is_form(req: &StatusRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

async fn index_page(state: &RwLock<State>) -> StatusResult<HttpResponse> {
    let services = state.read().registry.ordered();

    let mut page = render::page_begin(INDEX_TITLE)?;
    for (name, service) in &services {
        page.push_str(&render::service_entry(name)?);
        let fragment = service.summary_fragment(name).await.inspect_err(|err| {
            tracing::debug!(service = %name, error = %err, "summary failed");
        })?;
        page.push_str(&fragment);
    }
    page.push_str(PAGE_END);

    Ok(response::html(StatusCode::OK, page))
}

async fn detail_page(
    state: &RwLock<State>,
    name: &str,
    req: &StatusRequest,
) -> StatusResult<HttpResponse> {
    let service = state
        .read()
        .registry
        .lookup(name)
        .ok_or_else(|| StatusError::UnknownService(name.to_string()))?;

    let mut sink = ResponseSink::new();
    service.render_detail_page(name, &mut sink, req).await?;
    Ok(response::from_sink(sink))
}
