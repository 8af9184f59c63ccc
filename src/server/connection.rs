// src/server/connection.rs
//! One WebSocket connection: a reader loop plus a writer task

use crate::server::dispatcher::{Caller, CommandDispatcher};
use crate::server::registry::{ChannelSink, Outbound};
use crate::server::state::ServerState;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Serve one client until it disconnects or `cancel` fires
pub async fn handle_connection(
    state: Arc<ServerState>,
    stream: TcpStream,
    peer: SocketAddr,
    cancel: CancellationToken,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let id = state.next_connection_id();
    info!(%peer, connection = id, "Client connected");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(state.config.server.outbound_queue_size.max(1));

    // Writer: drains the outbound queue until every sender is gone or a close is requested
    let mut writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let result = match outbound {
                Outbound::Text(text) => ws_tx.send(Message::Text(text.to_string())).await,
                Outbound::Close => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            };
            if let Err(e) = result {
                debug!(connection = id, error = %e, "Write failed");
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let caller = Caller {
        id,
        sink: Arc::new(ChannelSink::new(tx.clone())),
    };
    let dispatcher = CommandDispatcher::new(Arc::clone(&state));

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = ws_rx.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                let response = dispatcher.dispatch(&text, &caller).await;
                if tx.send(Outbound::Text(Arc::from(response.to_json()))).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            // Ping/pong is answered by tungstenite; binary frames carry no commands
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(connection = id, error = %e, "Read failed");
                break;
            }
        }
    }

    state.registry.remove(id);
    if cancel.is_cancelled() {
        let _ = tx.try_send(Outbound::Close);
    }
    drop(caller);
    drop(tx);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        debug!(connection = id, "Writer did not drain in time");
        writer.abort();
    }
    info!(%peer, connection = id, "Client disconnected");
}
