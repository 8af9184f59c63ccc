// src/server/broadcaster.rs
//! Periodic fan-out of stream samples to subscribers
//!
//! Each cycle produces at most one tick, serializes the stream frame once and
//! delivers the same bytes to every subscriber concurrently. A subscriber whose
//! send fails or exceeds the send timeout is pruned after the whole pass, so a
//! slow client never delays delivery to the others.

use crate::hal::ConnectorError;
use crate::server::protocol::{Response, ServerInfo, StreamPayload};
use crate::server::registry::{DeliveryError, SubscriberId};
use crate::server::state::ServerState;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of one broadcast pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub pruned: usize,
}

/// Run one broadcast pass.
///
/// With no subscribers nothing is generated and an empty report is returned.
pub async fn broadcast_once(state: &ServerState) -> Result<BroadcastReport, ConnectorError> {
    if state.registry.is_empty() {
        return Ok(BroadcastReport::default());
    }

    let interval = state.stream.interval_seconds();
    let sample = state.assembler.lock().await.tick(interval).await?;

    let snapshot = state.registry.snapshot();
    let frame = Response::Stream {
        data: StreamPayload {
            sample,
            server_info: ServerInfo {
                frequency_hz: state.stream.frequency_hz(),
                connected_clients: snapshot.len(),
            },
        },
    };
    let message: Arc<str> = Arc::from(frame.to_json());

    let send_timeout = state.send_timeout();
    let deliveries = snapshot.iter().map(|(id, sink)| {
        let message = Arc::clone(&message);
        async move {
            match tokio::time::timeout(send_timeout, sink.send(message)).await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => {
                    warn!(subscriber = id, error = %e, "Error sending to subscriber");
                    Some(*id)
                }
                Err(_) => {
                    let e = DeliveryError::Timeout(send_timeout.as_millis() as u64);
                    warn!(subscriber = id, error = %e, "Error sending to subscriber");
                    Some(*id)
                }
            }
        }
    });

    let failed: Vec<SubscriberId> = join_all(deliveries).await.into_iter().flatten().collect();
    let pruned = state.registry.remove_many(&failed);
    if pruned > 0 {
        info!(pruned, remaining = state.registry.len(), "Removed disconnected subscribers");
    }

    Ok(BroadcastReport {
        delivered: snapshot.len() - failed.len(),
        pruned,
    })
}

/// Broadcast loop; the interval is re-read every cycle so frequency changes apply immediately
pub async fn run(state: Arc<ServerState>, cancel: CancellationToken) {
    info!(frequency_hz = state.stream.frequency_hz(), "Starting biofeedback broadcast loop");

    while !cancel.is_cancelled() {
        match broadcast_once(&state).await {
            Ok(report) if report.delivered > 0 || report.pruned > 0 => {
                debug!(delivered = report.delivered, pruned = report.pruned, "Broadcast pass");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Broadcast tick failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(state.stream.interval()) => {}
        }
    }

    info!("Broadcast loop stopped");
}
