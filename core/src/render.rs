//! # Renderer
//!
//! Page fragments shared by the index page, the error page and any service
//! building its own detail page. Templates are compiled into the binary by
//! `askama` and escape their inputs for HTML; link targets are percent-encoded
//! before they reach the template.

use askama::Template;

use crate::error::StatusResult;

/// Closing fragment of every status page.
pub const PAGE_END: &str = r#"<script>
Array.from(document.getElementsByClassName("expandButton")).forEach(function (item) {
	item.addEventListener("click", function () {
		var content = this.nextElementSibling;
		if (content.style.display === "block") {
			content.style.display = "none";
		} else {
			content.style.display = "block";
		}
	});
});
</script>
</body>
</html>
"#;

/// Title used for the aggregated index page.
pub const INDEX_TITLE: &str = "Main";

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html>
<head>
	<title>{{ title }} status page</title>
	<style>
		.expandable {
			display: none;
		}
	</style>
</head>
<body>
	<p><a href='./status'>Main status page</a></p>
	<h1>{{ title }} Status Page</h1>
"#,
    ext = "html"
)]
struct PageBegin<'a> {
    title: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<h1><a href="./status?service={{ target }}">{{ name }}</a></h1>
"#,
    ext = "html"
)]
struct ServiceEntry<'a> {
    target: &'a str,
    name: &'a str,
}

#[derive(Template)]
#[template(source = "{{ message }}", ext = "html")]
struct ErrorBody<'a> {
    message: &'a str,
}

/// Opening fragment of a status page titled `title`.
pub fn page_begin(title: &str) -> StatusResult<String> {
    Ok(PageBegin { title }.render()?)
}

/// Index entry linking to the detail page of the service registered as `name`.
///
/// The name is percent-encoded in the link target and HTML-escaped in the label.
pub fn service_entry(name: &str) -> StatusResult<String> {
    let target = urlencoding::encode(name);
    Ok(ServiceEntry {
        target: &target,
        name,
    }
    .render()?)
}

/// Error message escaped for use as an HTML body.
pub fn error_body(message: &str) -> StatusResult<String> {
    Ok(ErrorBody { message }.render()?)
}
