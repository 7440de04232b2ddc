//! Base Service
//!
//! Process identity, uptime, command line and environment. Registered by every
//! server under the name "Base".

use askama::Template;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use chrono_humanize::{Accuracy, HumanTime, Tense};
use statuspages_core::prelude::*;

use crate::templates::{Detail, Summary, TIMESTAMP_FORMAT};

/// Name the server registers the base service under.
pub const BASE_SERVICE_NAME: &str = "Base";

/// Built-in service describing the running process.
#[derive(Debug, Clone)]
pub struct BaseService {
    start_time: DateTime<Utc>,
}

impl BaseService {
    /// Base service whose uptime counts from now.
    pub fn new() -> Self {
        Self::with_start_time(Utc::now())
    }

    pub fn with_start_time(start_time: DateTime<Utc>) -> Self {
        Self { start_time }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Index snippet as it reads at `now`.
    pub fn summary_at(&self, now: DateTime<Utc>) -> anyhow::Result<String> {
        let process_name = std::env::args_os()
            .next()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default();
        let now_text = now.format(TIMESTAMP_FORMAT).to_string();
        let start_text = self.start_time.format(TIMESTAMP_FORMAT).to_string();
        let ago = relative_time(self.start_time, now);

        Ok(Summary {
            process_name: &process_name,
            now: &now_text,
            start_time: &start_text,
            start_time_ago: &ago,
        }
        .render()?)
    }
}

impl Default for BaseService {
    fn default() -> Self {
        Self::new()
    }
}

/// "3 hours ago" style phrase for `then` as seen from `now`.
fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.abs() < TimeDelta::seconds(1) {
        return "now".to_string();
    }
    let tense = if elapsed > TimeDelta::zero() {
        Tense::Past
    } else {
        Tense::Future
    };
    HumanTime::from(elapsed.abs()).to_text_en(Accuracy::Rough, tense)
}

#[async_trait]
impl Service for BaseService {
    async fn summary_fragment(&self, _name: &str) -> anyhow::Result<String> {
        self.summary_at(Utc::now())
    }

    async fn render_detail_page(
        &self,
        name: &str,
        sink: &mut ResponseSink,
        _request: &StatusRequest,
    ) -> anyhow::Result<()> {
        let command_line: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let env: Vec<String> = std::env::vars_os()
            .map(|(key, value)| format!("{}={}", key.to_string_lossy(), value.to_string_lossy()))
            .collect();

        let mut page = page_begin(name)?;
        page.push_str(
            &Detail {
                command_line: &command_line,
                env: &env,
            }
            .render()?,
        );
        page.push_str(PAGE_END);

        sink.set_html();
        sink.write_str(&page);
        Ok(())
    }
}
