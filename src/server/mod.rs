// src/server/mod.rs
//! WebSocket streaming server
//!
//! [`BiofeedbackServer`] binds the listener, runs one task per connection and
//! one broadcaster task, and performs the ordered shutdown: stop the
//! broadcaster, notify subscribers, close connections, close the connector
//! and finally persist the session.

pub mod broadcaster;
pub mod connection;
pub mod dispatcher;
pub mod protocol;
pub mod registry;
pub mod state;

pub use broadcaster::{broadcast_once, BroadcastReport};
pub use dispatcher::{Caller, CommandDispatcher};
pub use protocol::{Command, ProtocolError, Response, ServerInfo, ServerStatus, StreamPayload};
pub use registry::{ChannelSink, DeliveryError, MessageSink, Outbound, SubscriberId, SubscriptionRegistry};
pub use state::{ServerState, StreamSettings};

use crate::acquisition::session_log::{write_artifact, SessionError};
use crate::config::SystemConfig;
use crate::error::BiofeedbackResult;
use crate::utils::time::SystemTimeProvider;
use futures_util::future::join_all;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct BiofeedbackServer {
    state: Arc<ServerState>,
    listener: TcpListener,
}

impl BiofeedbackServer {
    /// Bind with the built-in simulator and the system clock
    pub async fn bind(config: SystemConfig) -> BiofeedbackResult<Self> {
        let state = ServerState::with_simulator(config, Arc::new(SystemTimeProvider))?;
        Self::bind_with_state(state).await
    }

    /// Bind around a prepared state, e.g. one with a custom connector
    pub async fn bind_with_state(state: ServerState) -> BiofeedbackResult<Self> {
        let listener = TcpListener::bind(state.config.server.bind_address()).await?;
        let connector = state.assembler.lock().await.connector_info().kind;

        info!(
            address = %listener.local_addr()?,
            frequency_hz = state.stream.frequency_hz(),
            interval_seconds = state.stream.interval_seconds(),
            %connector,
            "Biofeedback server bound"
        );

        Ok(Self {
            state: Arc::new(state),
            listener,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Accept connections until `shutdown` fires, then shut down in order.
    ///
    /// Returns the session artifact path when one was written.
    pub async fn serve(self, shutdown: CancellationToken) -> BiofeedbackResult<Option<PathBuf>> {
        let Self { state, listener } = self;
        state.mark_running();
        state
            .assembler
            .lock()
            .await
            .begin_session(state.time_provider.now());
        info!(address = %listener.local_addr()?, "WebSocket server listening");

        let broadcast_cancel = CancellationToken::new();
        let broadcaster = tokio::spawn(broadcaster::run(Arc::clone(&state), broadcast_cancel.clone()));

        let connection_cancel = CancellationToken::new();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(connection::handle_connection(
                            Arc::clone(&state),
                            stream,
                            peer,
                            connection_cancel.clone(),
                        ));
                    }
                    Err(e) => warn!(error = %e, "Failed to accept connection"),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        info!("Stopping biofeedback server");
        state.mark_stopped();
        drop(listener);

        broadcast_cancel.cancel();
        if let Err(e) = broadcaster.await {
            warn!(error = %e, "Broadcaster task ended abnormally");
        }

        notify_shutdown(&state).await;

        connection_cancel.cancel();
        let drained = tokio::time::timeout(CONNECTION_DRAIN_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("Connections did not close in time, aborting");
            connections.abort_all();
        }

        match state.assembler.lock().await.close_connector().await {
            Ok(()) => info!("Sensor connector closed"),
            Err(e) => error!(error = %e, "Error closing sensor connector"),
        }

        Ok(save_session(&state).await)
    }
}

/// Send one `server_shutdown` frame to every subscriber and ask each to close.
///
/// Returns how many subscribers received the frame.
pub async fn notify_shutdown(state: &ServerState) -> usize {
    let subscribers = state.registry.drain();
    if subscribers.is_empty() {
        return 0;
    }

    let message: Arc<str> = Arc::from(Response::server_shutdown().to_json());
    let send_timeout = state.send_timeout();
    let results = join_all(subscribers.iter().map(|(_, sink)| {
        let message = Arc::clone(&message);
        async move {
            let sent = matches!(tokio::time::timeout(send_timeout, sink.send(message)).await, Ok(Ok(())));
            let _ = tokio::time::timeout(send_timeout, sink.close()).await;
            sent
        }
    }))
    .await;

    let notified = results.into_iter().filter(|sent| *sent).count();
    info!(notified, total = subscribers.len(), "Notified subscribers of shutdown");
    notified
}

/// Persist the session log if any sample was generated. Failures are logged, never propagated.
pub async fn save_session(state: &ServerState) -> Option<PathBuf> {
    let (artifact, now) = {
        let assembler = state.assembler.lock().await;
        let log = assembler.session_log();
        if log.is_empty() {
            info!("No samples generated, skipping session save");
            return None;
        }
        let now = state.time_provider.now();
        (log.to_artifact(now, state.stream.frequency_hz()), now)
    };

    let session = &state.config.session;
    let write = write_artifact(&artifact, &session.output_dir, &session.file_prefix, now);
    match tokio::time::timeout(session.write_timeout(), write).await {
        Ok(Ok(path)) => Some(path),
        Ok(Err(e)) => {
            error!(error = %e, "Failed to save session data");
            None
        }
        Err(_) => {
            error!(error = %SessionError::Timeout(session.write_timeout_ms), "Failed to save session data");
            None
        }
    }
}
