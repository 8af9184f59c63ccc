// tests/broadcast_fanout.rs
//! Broadcast delivery, pruning and shutdown notification

mod common;

use async_trait::async_trait;
use biofeedback_core::server::broadcaster;
use biofeedback_core::server::{
    broadcast_once, notify_shutdown, BroadcastReport, DeliveryError, MessageSink, ServerState,
};
use common::{simulator_state, test_config, FailingSink, RecordingSink, StalledSink};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_empty_registry_generates_nothing() {
    let state = simulator_state(test_config());

    let report = broadcast_once(&state).await.expect("broadcast succeeds");

    assert_eq!(report, BroadcastReport::default());
    assert_eq!(state.assembler.lock().await.samples_generated(), 0);
    assert_eq!(state.context.current_time(), 0.0);
}

#[tokio::test]
async fn test_all_subscribers_receive_identical_frame() {
    let state = simulator_state(test_config());
    let sinks: Vec<Arc<RecordingSink>> = (0..3).map(|_| Arc::new(RecordingSink::default())).collect();
    for (id, sink) in sinks.iter().enumerate() {
        state.registry.add(id as u64 + 1, sink.clone() as Arc<dyn MessageSink>);
    }

    let report = broadcast_once(&state).await.expect("broadcast succeeds");
    assert_eq!(report, BroadcastReport { delivered: 3, pruned: 0 });

    let first = sinks[0].messages();
    assert_eq!(first.len(), 1);
    for sink in &sinks[1..] {
        assert_eq!(sink.messages(), first);
    }

    let json = sinks[0].last_json();
    assert_eq!(json["type"], "stream");
    assert_eq!(json["data"]["scenario"], "mixed");
    assert_eq!(json["data"]["server_info"]["frequency_hz"], 10.0);
    assert_eq!(json["data"]["server_info"]["connected_clients"], 3);
    assert!(json["data"]["stress"].is_number());
    assert_eq!(state.assembler.lock().await.samples_generated(), 1);
}

#[tokio::test]
async fn test_failing_subscriber_is_pruned() {
    let state = simulator_state(test_config());
    let healthy = Arc::new(RecordingSink::default());
    state.registry.add(1, healthy.clone());
    state.registry.add(2, Arc::new(FailingSink));

    let report = broadcast_once(&state).await.expect("broadcast succeeds");

    assert_eq!(report, BroadcastReport { delivered: 1, pruned: 1 });
    assert!(state.registry.contains(1));
    assert!(!state.registry.contains(2));
    assert_eq!(healthy.messages().len(), 1);

    broadcast_once(&state).await.expect("broadcast succeeds");
    assert_eq!(healthy.messages().len(), 2);
}

#[tokio::test]
async fn test_stalled_subscriber_does_not_delay_others() {
    let mut config = test_config();
    config.server.send_timeout_ms = 100;
    let state = simulator_state(config);
    let healthy = Arc::new(RecordingSink::default());
    state.registry.add(1, Arc::new(StalledSink));
    state.registry.add(2, healthy.clone());

    let started = Instant::now();
    let report = broadcast_once(&state).await.expect("broadcast succeeds");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report, BroadcastReport { delivered: 1, pruned: 1 });
    assert_eq!(healthy.messages().len(), 1);
    assert!(!state.registry.contains(1));
}

#[tokio::test]
async fn test_broadcast_loop_streams_until_cancelled() {
    let mut config = test_config();
    config.server.stream_frequency_hz = 50.0;
    let state = simulator_state(config);
    let sink = Arc::new(RecordingSink::default());
    state.registry.add(1, sink.clone());

    let cancel = CancellationToken::new();
    let task = tokio::spawn(broadcaster::run(state.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("loop stops after cancel")
        .expect("loop task does not panic");

    let received = sink.messages().len();
    assert!(received >= 3, "received only {} frames", received);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.messages().len(), received);
    assert_eq!(state.assembler.lock().await.samples_generated(), received);
}

/// Records stream frames and retunes the stream once `switch_after` frames arrived
struct RetuningSink {
    state: Arc<ServerState>,
    switch_after: usize,
    switch_to_hz: f64,
    frames: Mutex<Vec<serde_json::Value>>,
}

impl RetuningSink {
    fn frames(&self) -> Vec<serde_json::Value> {
        self.frames.lock().clone()
    }
}

#[async_trait]
impl MessageSink for RetuningSink {
    async fn send(&self, message: Arc<str>) -> Result<(), DeliveryError> {
        let mut frames = self.frames.lock();
        frames.push(serde_json::from_str(&message).expect("valid JSON"));
        if frames.len() == self.switch_after {
            self.state
                .stream
                .set_frequency_hz(self.switch_to_hz)
                .expect("valid frequency");
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_frequency_change_applies_to_next_cycle() {
    let state = simulator_state(test_config());
    let sink = Arc::new(RetuningSink {
        state: state.clone(),
        switch_after: 2,
        switch_to_hz: 50.0,
        frames: Mutex::new(Vec::new()),
    });
    state.registry.add(1, sink.clone());

    let cancel = CancellationToken::new();
    let task = tokio::spawn(broadcaster::run(state.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();
    task.await.expect("loop task does not panic");
    state.registry.drain();

    let frames = sink.frames();
    assert!(frames.len() >= 6, "received only {} frames", frames.len());
    for frame in &frames[..2] {
        assert_eq!(frame["data"]["server_info"]["frequency_hz"], 10.0);
    }
    for frame in &frames[2..] {
        assert_eq!(frame["data"]["server_info"]["frequency_hz"], 50.0);
    }

    // Two ticks at 0.1 s, every later tick at 0.02 s
    let expected_clock = 2.0 * 0.1 + (frames.len() - 2) as f64 * 0.02;
    assert!(
        (state.context.current_time() - expected_clock).abs() < 1e-9,
        "clock {} expected {}",
        state.context.current_time(),
        expected_clock
    );
}

#[tokio::test]
async fn test_low_frequency_spaces_frames() {
    let state = simulator_state(test_config());
    state.stream.set_frequency_hz(0.1).expect("valid frequency");
    let sink = Arc::new(RecordingSink::default());
    state.registry.add(1, sink.clone());

    let cancel = CancellationToken::new();
    let task = tokio::spawn(broadcaster::run(state.clone(), cancel.clone()));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sink.messages().len(), 1);

    cancel.cancel();
    task.await.expect("loop task does not panic");
    assert!((state.context.current_time() - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_shutdown_notification_drains_registry() {
    let state = simulator_state(test_config());
    let first = Arc::new(RecordingSink::default());
    let second = Arc::new(RecordingSink::default());
    state.registry.add(1, first.clone());
    state.registry.add(2, second.clone());
    state.registry.add(3, Arc::new(FailingSink));

    let notified = notify_shutdown(&state).await;

    assert_eq!(notified, 2);
    assert!(state.registry.is_empty());
    for sink in [&first, &second] {
        let json = sink.last_json();
        assert_eq!(json["type"], "server_shutdown");
        assert_eq!(json["message"], "Server is shutting down");
        assert!(sink.is_closed());
    }
}
