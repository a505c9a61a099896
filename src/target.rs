//! A monitored endpoint: immutable probe spec plus last-observed state.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::actors::messages::ProbeResult;
use crate::config::TargetConfig;

/// One monitored HTTP endpoint.
///
/// The spec never changes after startup. The observed state is mutated by
/// exactly one probe at a time: the scheduler fires a target at most once per
/// interval and config validation guarantees a probe finishes within that
/// interval, so the mutex is uncontended and only exists to make the sharing
/// sound. It must never be held across an await point.
#[derive(Debug)]
pub struct Target {
    pub spec: TargetConfig,
    state: Mutex<TargetState>,
}

/// Mutable results of the most recent probe.
#[derive(Debug, Clone)]
pub struct TargetState {
    /// When the last probe was issued.
    pub timestamp: Option<DateTime<Utc>>,

    /// HTTP status code of the last response, 0 before the first one.
    pub status_code: u16,

    /// Response time of the last probe in milliseconds.
    pub response_time: u64,

    /// Error text of the last probe, empty when it succeeded.
    pub error: String,

    /// Classification of the *previous* probe, read for edge-detection before
    /// the in-flight probe overwrites it. Starts `true` so the very first
    /// failure alerts and the very first success does not.
    pub previously_ok: bool,
}

impl Target {
    pub fn new(spec: TargetConfig) -> Arc<Self> {
        Arc::new(Self {
            spec,
            state: Mutex::new(TargetState {
                timestamp: None,
                status_code: 0,
                response_time: 0,
                error: String::new(),
                previously_ok: true,
            }),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, TargetState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Immutable snapshot of spec + state for broadcasting.
    ///
    /// Takes the already-held guard so a probe can snapshot mid-update without
    /// re-locking.
    pub fn snapshot(&self, state: &TargetState) -> ProbeResult {
        ProbeResult {
            id: self.spec.id.clone(),
            url: self.spec.url.clone(),
            name: self.spec.name.clone(),
            description: self.spec.description.clone(),
            method: self.spec.method.clone(),
            interval: self.spec.interval,
            timeout: self.spec.timeout,
            timestamp: state.timestamp,
            status_code: state.status_code,
            response_time: state.response_time,
            error: state.error.clone(),
            previous_ok: state.previously_ok,
        }
    }
}
