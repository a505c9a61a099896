//! Shared test helpers

use std::sync::Arc;

use upcheck::actors::broker::BrokerHandle;
use upcheck::actors::prober::Prober;
use upcheck::alerts::AlertSink;
use upcheck::config::{AlertSinkConfig, TargetConfig};
use upcheck::target::Target;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn make_target_config(id: &str, url: &str, interval: u64, timeout: u64) -> TargetConfig {
    TargetConfig {
        id: id.to_string(),
        url: url.to_string(),
        name: format!("Test {id}"),
        description: String::new(),
        method: "GET".to_string(),
        interval,
        timeout,
    }
}

pub fn make_target(id: &str, url: &str, interval: u64, timeout: u64) -> Arc<Target> {
    Target::new(make_target_config(id, url, interval, timeout))
}

/// Mock alert sink accepting every POST to /hook.
pub async fn spawn_sink() -> MockServer {
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&sink)
        .await;
    sink
}

/// Texts of all alerts the sink received, in arrival order.
pub async fn sink_texts(sink: &MockServer) -> Vec<String> {
    sink.received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["text"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

/// A prober wired to a fresh broker and the given sink.
pub fn make_prober(broker: &BrokerHandle, sink: &MockServer) -> Prober {
    let alerts = AlertSink::new(AlertSinkConfig {
        url: format!("{}/hook", sink.uri()),
        ..AlertSinkConfig::default()
    });
    Prober::new(broker.clone(), alerts)
}
