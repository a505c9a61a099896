//! Broker actor - single authority over the live subscriber set
//!
//! The broker is the only component that adds, removes, or iterates
//! subscribers, which rules out data races over the set without any shared
//! locking. All three message kinds arrive through one queue, so a publish
//! never observes a half-updated set and a subscriber added mid-publish only
//! sees results from its connection point forward.
//!
//! ## Message Flow
//!
//! ```text
//! Prober ──Publish──▶ ┌────────────┐ ──▶ conduit 1 ──▶ event stream 1
//!                     │ BrokerActor│ ──▶ conduit 2 ──▶ event stream 2
//! HTTP   ──Subscribe─▶│ (one loop) │ ──▶ ...
//! client ◀─Unsubscribe└────────────┘
//! ```
//!
//! Publishing awaits each conduit in turn. A subscriber that stops draining
//! its conduit therefore stalls fan-out to everyone behind it; the broker
//! never unilaterally drops a slow subscriber. Disconnection is the only exit:
//! dropping a [`Subscription`] unsubscribes, and a conduit whose receiver is
//! already gone is pruned when a send to it fails.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::messages::{BrokerMessage, ProbeResult};

/// Per-subscriber conduit depth. Small on purpose: a subscriber that falls
/// this far behind starts exerting backpressure on fan-out instead of
/// accumulating unbounded backlog.
const SUBSCRIBER_BUFFER: usize = 8;

/// Actor owning the active subscriber set.
pub struct BrokerActor {
    /// Conduits of all currently attached subscribers.
    subscribers: Vec<mpsc::Sender<ProbeResult>>,

    /// Single serialized queue for subscribe/unsubscribe/publish.
    message_rx: mpsc::UnboundedReceiver<BrokerMessage>,
}

impl BrokerActor {
    fn new(message_rx: mpsc::UnboundedReceiver<BrokerMessage>) -> Self {
        Self {
            subscribers: Vec::new(),
            message_rx,
        }
    }

    /// Run the actor's main loop.
    ///
    /// Exits when every handle (and every live subscription) is gone.
    pub async fn run(mut self) {
        debug!("starting broker actor");

        while let Some(message) = self.message_rx.recv().await {
            match message {
                BrokerMessage::Subscribe { conduit } => {
                    self.subscribers.push(conduit);
                    trace!("subscriber attached, {} active", self.subscribers.len());
                }

                BrokerMessage::Unsubscribe { conduit } => {
                    self.subscribers.retain(|s| !s.same_channel(&conduit));
                    trace!("subscriber detached, {} active", self.subscribers.len());
                }

                BrokerMessage::Publish { result } => {
                    self.publish(result).await;
                }
            }
        }

        debug!("broker actor stopped");
    }

    /// Send one result to every attached subscriber.
    ///
    /// A send only fails when the receiving half is gone, i.e. the subscriber
    /// task died without unsubscribing; those conduits are pruned here so a
    /// vanished observer cannot wedge future publishes.
    async fn publish(&mut self, result: ProbeResult) {
        let mut dead = Vec::new();

        for (index, conduit) in self.subscribers.iter().enumerate() {
            if conduit.send(result.clone()).await.is_err() {
                dead.push(index);
            }
        }

        for index in dead.into_iter().rev() {
            warn!("pruning subscriber with closed conduit");
            self.subscribers.swap_remove(index);
        }
    }
}

/// Handle for talking to the broker.
///
/// Cloneable; the prober publishes through it and the HTTP layer subscribes
/// through it.
#[derive(Debug, Clone)]
pub struct BrokerHandle {
    sender: mpsc::UnboundedSender<BrokerMessage>,
}

impl BrokerHandle {
    /// Spawn the broker actor and return a handle to it.
    pub fn spawn() -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        tokio::spawn(BrokerActor::new(message_rx).run());

        Self { sender: message_tx }
    }

    /// Attach a new subscriber.
    ///
    /// The subscriber only receives results published after this call; there
    /// is no replay of earlier ones.
    pub fn subscribe(&self) -> Subscription {
        let (conduit, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        // Queued on the same channel as publishes, so ordering relative to
        // in-flight results is well defined.
        let _ = self.sender.send(BrokerMessage::Subscribe {
            conduit: conduit.clone(),
        });

        Subscription {
            rx,
            conduit,
            broker: self.sender.clone(),
        }
    }

    /// Hand a probe result to the broker for fan-out.
    ///
    /// Returns immediately; delivery happens in the broker's loop.
    pub fn publish(&self, result: ProbeResult) {
        if self.sender.send(BrokerMessage::Publish { result }).is_err() {
            warn!("broker is gone, dropping probe result");
        }
    }
}

/// One subscriber's end of the result stream.
///
/// Dropping the subscription unsubscribes from the broker, which is the only
/// way a conduit leaves the active set.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<ProbeResult>,
    conduit: mpsc::Sender<ProbeResult>,
    broker: mpsc::UnboundedSender<BrokerMessage>,
}

impl Subscription {
    /// Receive the next published result, or `None` once the stream ends.
    pub async fn recv(&mut self) -> Option<ProbeResult> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = ProbeResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.broker.send(BrokerMessage::Unsubscribe {
            conduit: self.conduit.clone(),
        });
    }
}
