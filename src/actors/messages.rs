//! Message types for actor communication
//!
//! Two kinds of message flow through the system:
//!
//! 1. **Events**: [`ProbeResult`] snapshots, produced once per probe and
//!    fanned out read-only to every subscriber
//! 2. **Broker control**: [`BrokerMessage`] variants, all funneled through one
//!    queue so membership changes and publishes stay linearized

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

/// Immutable snapshot of a target at the moment a probe completed.
///
/// This is the unit broadcast to subscribers and serialized onto the event
/// stream. `previous_ok` carries the classification of the probe *before* the
/// one that produced this result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub id: String,
    pub url: String,
    pub name: String,
    pub description: String,
    pub method: String,
    pub interval: u64,
    pub timeout: u64,
    pub timestamp: Option<DateTime<Utc>>,
    pub status_code: u16,
    pub response_time: u64,
    pub error: String,
    pub previous_ok: bool,
}

/// Control messages for the broker actor.
///
/// Subscriber identity is structural: the conduit itself, compared via
/// [`mpsc::Sender::same_channel`].
#[derive(Debug)]
pub enum BrokerMessage {
    /// Add a subscriber conduit to the active set.
    Subscribe { conduit: mpsc::Sender<ProbeResult> },

    /// Remove a conduit from the active set. Dropping the broker's clone
    /// closes the conduit once the subscriber's own clone is gone.
    Unsubscribe { conduit: mpsc::Sender<ProbeResult> },

    /// Fan a result out to every currently subscribed conduit.
    Publish { result: ProbeResult },
}

/// Kind of health transition a probe detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The target stopped answering within its timeout.
    TimedOut,
    /// The target became unreachable (connection, DNS, TLS, ...).
    Down,
    /// The target recovered after one or more failures.
    Up,
}
