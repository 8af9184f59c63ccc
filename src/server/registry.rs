// src/server/registry.rs
//! Subscriber registry and message sinks
//!
//! A subscriber is an open connection identified by its connection id. The
//! registry only stores a [`MessageSink`] per id; it never touches sockets.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Identity of one client connection
pub type SubscriberId = u64;

/// Per-subscriber delivery failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryError {
    #[error("Connection closed")]
    Closed,

    #[error("Send timed out after {0} ms")]
    Timeout(u64),
}

/// Destination for outbound text frames
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError>;

    /// Ask the transport to close after flushing queued frames
    async fn close(&self) -> Result<(), DeliveryError> {
        Ok(())
    }
}

/// Frames handed from dispatcher and broadcaster to a connection's writer task
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(Arc<str>),
    Close,
}

/// Sink backed by a connection's bounded outbound queue
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Outbound>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Outbound>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError> {
        self.tx
            .send(Outbound::Text(message))
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    async fn close(&self) -> Result<(), DeliveryError> {
        self.tx.send(Outbound::Close).await.map_err(|_| DeliveryError::Closed)
    }
}

/// Set of subscribed connections
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscribers: Mutex<HashMap<SubscriberId, Arc<dyn MessageSink>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `id` was already subscribed; its sink is replaced
    pub fn add(&self, id: SubscriberId, sink: Arc<dyn MessageSink>) -> bool {
        self.subscribers.lock().insert(id, sink).is_none()
    }

    /// Returns `true` when `id` was subscribed
    pub fn remove(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().remove(&id).is_some()
    }

    /// Remove every listed id in one critical section, returning how many were present
    pub fn remove_many(&self, ids: &[SubscriberId]) -> usize {
        let mut subscribers = self.subscribers.lock();
        ids.iter().filter(|id| subscribers.remove(id).is_some()).count()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.lock().contains_key(&id)
    }

    /// Point-in-time copy of the members, safe to iterate across `.await`
    pub fn snapshot(&self) -> Vec<(SubscriberId, Arc<dyn MessageSink>)> {
        self.subscribers
            .lock()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect()
    }

    /// Empty the registry, returning the former members
    pub fn drain(&self) -> Vec<(SubscriberId, Arc<dyn MessageSink>)> {
        self.subscribers.lock().drain().collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }
}
