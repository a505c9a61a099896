//! Fan-out behavior under live probing

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use upcheck::actors::broker::BrokerHandle;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_every_observer_sees_each_result_exactly_once() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let prober = make_prober(&broker, &sink);

    let mut observers: Vec<_> = (0..5).map(|_| broker.subscribe()).collect();

    let target = make_target("web", &endpoint.uri(), 1, 500);
    prober.probe(Arc::clone(&target)).await;

    for observer in &mut observers {
        let result = timeout(Duration::from_secs(2), observer.recv())
            .await
            .expect("every observer must receive the result")
            .unwrap();
        assert_eq!(result.id, "web");

        let duplicate = timeout(Duration::from_millis(100), observer.recv()).await;
        assert!(duplicate.is_err(), "observer received the result twice");
    }
}

#[tokio::test]
async fn test_late_observer_only_sees_later_probes() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let prober = make_prober(&broker, &sink);

    let mut early = broker.subscribe();

    let first = make_target("first", &endpoint.uri(), 1, 500);
    prober.probe(first).await;
    assert_eq!(early.recv().await.unwrap().id, "first");

    let mut late = broker.subscribe();

    let second = make_target("second", &endpoint.uri(), 1, 500);
    prober.probe(second).await;

    let result = timeout(Duration::from_secs(2), late.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.id, "second", "late observer must not see a backlog");
}

#[tokio::test]
async fn test_observer_disconnect_does_not_affect_probing_or_others() {
    let endpoint = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&endpoint)
        .await;

    let sink = spawn_sink().await;
    let broker = BrokerHandle::spawn();
    let prober = make_prober(&broker, &sink);

    let mut keeper = broker.subscribe();
    let leaver = broker.subscribe();

    let target = make_target("web", &endpoint.uri(), 1, 500);
    prober.probe(Arc::clone(&target)).await;
    assert_eq!(keeper.recv().await.unwrap().id, "web");

    drop(leaver);

    // Probing continues and the remaining observer still gets results.
    prober.probe(Arc::clone(&target)).await;
    let result = timeout(Duration::from_secs(2), keeper.recv())
        .await
        .expect("disconnect of one observer must not stall the other")
        .unwrap();
    assert_eq!(result.id, "web");
    assert_eq!(result.status_code, 200);

    let state = target.state();
    assert!(state.previously_ok, "probing must be unaffected by disconnects");
}
