//! Helper functions for integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use statwatch::{
    alerts::{AlertDispatcher, AlertMessage, AlertSink},
    config::Config,
    fetch::HttpStatsSource,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STATS_PATH: &str = "/_stats";

/// Collects every emitted alert line.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn dispatcher(&self) -> AlertDispatcher {
        AlertDispatcher::new(vec![Box::new(self.clone())])
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn emit(&self, alert: &AlertMessage) {
        self.lines.lock().unwrap().push(alert.to_string());
    }
}

pub fn create_test_config(url: &str) -> Config {
    let mut config = Config::default();
    config.source.url = url.to_string();
    config.source.interval_ms = 60_000;
    config.source.timeout_ms = 2_000;
    config
}

pub fn stats_url(server: &MockServer) -> String {
    format!("{}{STATS_PATH}", server.uri())
}

pub fn http_source(url: &str) -> HttpStatsSource {
    HttpStatsSource::new(url, Duration::from_secs(2)).unwrap()
}

pub async fn mount_stats(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}
