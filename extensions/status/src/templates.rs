//! HTML templates for the base service.

use askama::Template;

/// `HH:MM:SS DD/MM/YYYY`, used for every timestamp the base service shows.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

#[derive(Template)]
#[template(
    source = r#"
<ul>
	<li>Process name: {{ process_name }}</li>
	<li>Current time: {{ now }}</li>
	<li>Start time: {{ start_time }}, {{ start_time_ago }}</li>
</ul>
"#,
    ext = "html"
)]
pub struct Summary<'a> {
    pub process_name: &'a str,
    pub now: &'a str,
    pub start_time: &'a str,
    pub start_time_ago: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"
<h1>Command line:</h1>
<code>
	{% for arg in command_line %}{{ arg }} {% endfor %}
</code>

<h1>Environment:</h1>
<ul>
{% for var in env %}	<li>{{ var }}</li>
{% endfor %}</ul>
"#,
    ext = "html"
)]
pub struct Detail<'a> {
    pub command_line: &'a [String],
    pub env: &'a [String],
}
