//! Process diagnostics under `/pprof/`.
//!
//! Only what the process can report portably: an index of the endpoints and the
//! command line the process was started with.

use std::sync::Arc;

use http::StatusCode;
use statuspages_core::StatusRequest;

use crate::mux::{HandlerFuture, Route, RouteHandler};
use crate::response;

pub const ROOT: &str = "/pprof";
pub const PREFIX: &str = "/pprof/";
pub const CMDLINE: &str = "/pprof/cmdline";

/// `(pattern, route)` pairs every server binds.
pub(crate) fn routes() -> Vec<(&'static str, Route)> {
    let to_index: RouteHandler = Arc::new(|req: StatusRequest| {
        Box::pin(async move { redirect_to_index(&req) }) as HandlerFuture
    });
    vec![
        (ROOT, Route::Handler(to_index)),
        (PREFIX, Route::Handler(handler(index))),
        (CMDLINE, Route::Handler(handler(cmdline))),
    ]
}

fn handler(page: fn() -> response::HttpResponse) -> RouteHandler {
    Arc::new(move |_req: StatusRequest| Box::pin(async move { page() }) as HandlerFuture)
}

/// `/pprof` itself moves to `/pprof/`, keeping the query.
fn redirect_to_index(req: &StatusRequest) -> response::HttpResponse {
    match req.uri().query() {
        Some(query) => response::moved_permanently(&format!("{PREFIX}?{query}")),
        None => response::moved_permanently(PREFIX),
    }
}

fn index() -> response::HttpResponse {
    response::html(
        StatusCode::OK,
        "<html>\n<head><title>/pprof/</title></head>\n<body>\n\
         <p>Diagnostics:</p>\n\
         <ul>\n\t<li><a href=\"cmdline\">cmdline</a>: the command line of this process</li>\n</ul>\n\
         </body>\n</html>\n",
    )
}

/// Arguments separated by NUL bytes.
fn cmdline() -> response::HttpResponse {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    response::text(StatusCode::OK, args.join("\x00"))
}
