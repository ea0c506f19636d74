//! Heartbeat task
//!
//! Beats at the interval from Hello. The first beat waits a random fraction of
//! the interval. A beat that finds the previous one unacknowledged ends the
//! task so the connection can be replaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;

use super::session::Session;
use crate::protocol::GatewayMessage;

/// Delay before the first heartbeat for a `jitter` in `[0, 1]`
pub fn first_beat_delay(interval: Duration, jitter: f64) -> Duration {
    interval.mul_f64(jitter.clamp(0.0, 1.0))
}

/// Runs until the connection zombies or the send side closes
pub(crate) async fn run(
    interval: Duration,
    session: Arc<Mutex<Session>>,
    acked: Arc<AtomicBool>,
    outgoing: UnboundedSender<GatewayMessage>,
) {
    sleep(first_beat_delay(interval, rand::random::<f64>())).await;

    loop {
        if !acked.swap(false, Ordering::AcqRel) {
            tracing::warn!("Connection zombied (heartbeat not ACKed)");
            return;
        }

        let sequence = session.lock().sequence;
        if outgoing.send(GatewayMessage::heartbeat(sequence)).is_err() {
            return;
        }
        tracing::trace!(sequence = ?sequence, "Heartbeat sent");

        sleep(interval).await;
    }
}
