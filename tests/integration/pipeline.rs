//! End-to-end scheduler → dispatcher → prober → broker pipeline tests

use std::time::Duration;

use tokio::time::timeout;
use upcheck::actors::{broker::BrokerHandle, dispatcher, scheduler};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_scheduled_probe_flows_to_subscriber() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let mut sub = broker.subscribe();

    let prober = make_prober(&broker, &sink);
    let submit_tx = dispatcher::spawn(prober, 1);

    let target = make_target("web", &format!("{}/health", endpoint.uri()), 1, 500);
    let _handles = scheduler::start(&[target], submit_tx);

    // First firing is due after one interval.
    let result = timeout(Duration::from_secs(3), sub.recv())
        .await
        .expect("scheduled probe should reach the subscriber")
        .unwrap();

    assert_eq!(result.id, "web");
    assert_eq!(result.status_code, 200);
    assert!(result.error.is_empty());
    assert!(result.previous_ok);
}

#[tokio::test]
async fn test_targets_probe_on_independent_schedules() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let mut sub = broker.subscribe();

    let prober = make_prober(&broker, &sink);
    let submit_tx = dispatcher::spawn(prober, 2);

    let fast = make_target("fast", &endpoint.uri(), 1, 500);
    let slow = make_target("slow", &endpoint.uri(), 60, 500);
    let _handles = scheduler::start(&[fast, slow], submit_tx);

    // Within a few seconds only the fast target can have fired, repeatedly.
    let mut fast_results = 0;
    while fast_results < 2 {
        let result = timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("fast target should keep producing results")
            .unwrap();
        assert_eq!(result.id, "fast", "slow target fired long before its interval");
        fast_results += 1;
    }
}

#[tokio::test]
async fn test_failing_target_does_not_disturb_healthy_one() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let mut sub = broker.subscribe();

    let prober = make_prober(&broker, &sink);
    let submit_tx = dispatcher::spawn(prober, 2);

    let healthy = make_target("healthy", &endpoint.uri(), 1, 500);
    let broken = make_target("broken", "http://127.0.0.1:1/", 1, 500);
    let _handles = scheduler::start(&[healthy, broken], submit_tx);

    let mut saw_healthy_success = false;
    let mut saw_broken_failure = false;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !(saw_healthy_success && saw_broken_failure) {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let result = timeout(remaining, sub.recv())
            .await
            .expect("both targets should keep emitting results")
            .unwrap();

        match result.id.as_str() {
            "healthy" => {
                assert!(result.error.is_empty(), "healthy target was infected: {}", result.error);
                saw_healthy_success = true;
            }
            "broken" => {
                assert!(!result.error.is_empty());
                saw_broken_failure = true;
            }
            other => panic!("unexpected target {other}"),
        }
    }
}
