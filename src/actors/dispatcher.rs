//! Dispatcher - decouples "a probe is due" from "a probe is executing"
//!
//! A single relay task drains the bounded submission queue and spawns one
//! independent task per probe, so a due target never has to wait for another
//! target's probe to finish and the queue length stays bounded by the number
//! of targets.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::target::Target;

use super::prober::Prober;

/// Spawn the relay task and return the submission side of its queue.
///
/// `capacity` bounds submissions waiting to start, not probes in flight; each
/// submission becomes its own task. The relay stops once every scheduler loop
/// has dropped its sender.
pub fn spawn(prober: Prober, capacity: usize) -> mpsc::Sender<Arc<Target>> {
    let (submit_tx, submit_rx) = mpsc::channel(capacity.max(1));

    tokio::spawn(relay(prober, submit_rx));

    submit_tx
}

async fn relay(prober: Prober, mut submit_rx: mpsc::Receiver<Arc<Target>>) {
    debug!("starting dispatcher");

    while let Some(target) = submit_rx.recv().await {
        trace!("dispatching probe for '{}'", target.spec.id);

        let prober = prober.clone();
        tokio::spawn(async move {
            prober.probe(target).await;
        });
    }

    debug!("dispatcher stopped");
}
