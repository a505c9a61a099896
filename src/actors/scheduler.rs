//! Scheduler - one independent timer loop per target
//!
//! Each target gets its own task firing every `interval` seconds. Firings are
//! handed to the dispatcher queue without waiting for the probe to finish, so
//! a slow endpoint never delays another target's schedule. If the queue is
//! full the send blocks, which only stalls *that* target's loop until space
//! frees up.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, trace};

use crate::target::Target;

/// Spawn a timer loop for every target.
///
/// Loops run for the lifetime of the process; they only terminate if the
/// dispatcher side of the queue goes away. The first firing happens after one
/// full interval, not immediately.
pub fn start(targets: &[Arc<Target>], submit_tx: mpsc::Sender<Arc<Target>>) -> Vec<JoinHandle<()>> {
    targets
        .iter()
        .map(|target| {
            let target = Arc::clone(target);
            let submit_tx = submit_tx.clone();

            tokio::spawn(run_timer(target, submit_tx))
        })
        .collect()
}

async fn run_timer(target: Arc<Target>, submit_tx: mpsc::Sender<Arc<Target>>) {
    let period = Duration::from_secs(target.spec.interval);
    let mut ticker = interval_at(Instant::now() + period, period);

    debug!(
        "scheduling '{}' every {}s (timeout {}ms)",
        target.spec.id, target.spec.interval, target.spec.timeout
    );

    loop {
        ticker.tick().await;

        trace!("'{}' is due", target.spec.id);

        if submit_tx.send(Arc::clone(&target)).await.is_err() {
            debug!("dispatcher gone, stopping timer for '{}'", target.spec.id);
            break;
        }
    }
}
