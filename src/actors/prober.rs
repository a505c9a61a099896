//! Prober - executes one HTTP probe and classifies the outcome
//!
//! ## Probe Flow
//!
//! ```text
//! build request → send with timeout → classify
//!      │                                 │
//!      │ construction error              ├─ success: clear error, record
//!      │   record error, emit,           │    status + elapsed, emit,
//!      │   no alert                      │    alert "up" on false→true edge
//!      └─────────────────────────────────┤
//!                                        └─ failure: record error, emit,
//!                                             alert "timed out"/"down" on
//!                                             true→false edge
//! ```
//!
//! Alerts are strictly edge-triggered: the `previously_ok` flag is read before
//! this probe overwrites it, so consecutive failures (or successes) after the
//! first never re-alert. Non-2xx responses are transport-level successes and
//! take the success path; status-code health classification is deliberately
//! not performed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, Url};
use tracing::{info, instrument, trace, warn};

use crate::alerts::AlertSink;
use crate::target::Target;

use super::broker::BrokerHandle;
use super::messages::Transition;

/// Executes probes and routes their outcomes.
///
/// Cloneable so the dispatcher can hand one to every spawned probe task. The
/// HTTP client is shared; the timeout is applied per request from the
/// target's spec.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
    broker: BrokerHandle,
    alerts: AlertSink,
}

impl Prober {
    pub fn new(broker: BrokerHandle, alerts: AlertSink) -> Self {
        Self {
            client: Client::new(),
            broker,
            alerts,
        }
    }

    /// Perform exactly one probe against the target.
    ///
    /// Never returns an error: every outcome, including a malformed spec, is
    /// recorded on the target and emitted as a result.
    #[instrument(skip(self, target), fields(target = %target.spec.id))]
    pub async fn probe(&self, target: Arc<Target>) {
        trace!("probing {}", target.spec.url);

        // Request construction. A failure here is a config problem, not a
        // liveness event: record it, emit it, but never alert on it.
        let method = match Method::from_bytes(target.spec.method.as_bytes()) {
            Ok(method) => method,
            Err(e) => {
                self.emit_construction_error(&target, format!("invalid method: {e}"));
                return;
            }
        };
        let url = match Url::parse(&target.spec.url) {
            Ok(url) => url,
            Err(e) => {
                self.emit_construction_error(&target, format!("invalid url: {e}"));
                return;
            }
        };

        let timeout = Duration::from_millis(target.spec.timeout);
        let start = std::time::Instant::now();

        {
            let mut state = target.state();
            state.timestamp = Some(Utc::now());
        }

        let response = self
            .client
            .request(method, url)
            .timeout(timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status_code = response.status().as_u16();
                let elapsed_ms = start.elapsed().as_millis() as u64;

                let (snapshot, was_ok) = {
                    let mut state = target.state();
                    state.error.clear();
                    state.status_code = status_code;
                    state.response_time = elapsed_ms;
                    let was_ok = state.previously_ok;
                    let snapshot = target.snapshot(&state);
                    state.previously_ok = true;
                    (snapshot, was_ok)
                };

                info!(
                    "{} {} - {}ms - {}",
                    target.spec.method, target.spec.url, elapsed_ms, status_code
                );

                self.broker.publish(snapshot);

                if !was_ok {
                    self.alerts.notify(&target.spec, Transition::Up).await;
                }
            }

            Err(e) => {
                let timed_out = e.is_timeout();
                // Full chain: reqwest's Display alone omits the cause.
                let error_text = format!("{:#}", anyhow::Error::from(e));
                warn!("probe failed: {error_text}");

                // Emit before classifying further; the snapshot carries the
                // error but, for a timeout, still the previous response time.
                let snapshot = {
                    let mut state = target.state();
                    state.error = error_text;
                    target.snapshot(&state)
                };
                self.broker.publish(snapshot);

                let (was_ok, transition) = {
                    let mut state = target.state();
                    let was_ok = state.previously_ok;
                    let transition = if timed_out {
                        state.response_time = target.spec.timeout;
                        Transition::TimedOut
                    } else {
                        Transition::Down
                    };
                    state.previously_ok = false;
                    (was_ok, transition)
                };

                if was_ok {
                    self.alerts.notify(&target.spec, transition).await;
                }
            }
        }
    }

    /// Record a request-construction failure and surface it to subscribers.
    ///
    /// `previously_ok` is left untouched, so a later transport failure still
    /// alerts exactly once.
    fn emit_construction_error(&self, target: &Target, error: String) {
        warn!("cannot build request: {error}");

        let snapshot = {
            let mut state = target.state();
            state.error = error;
            target.snapshot(&state)
        };
        self.broker.publish(snapshot);
    }
}
