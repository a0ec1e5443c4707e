//! # Event Sinks
//!
//! Where the orchestrator sends progress. The sink owns encoding and
//! transport; the orchestrator only emits and, once, closes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::events::ComicEvent;

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event. Events sent after close are dropped.
    async fn emit(&self, event: ComicEvent);

    /// End the stream. Calling it again has no effect.
    async fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Sink over a bounded mpsc channel, drained by the HTTP layer.
///
/// A send that fails because the receiver is gone (client disconnected)
/// marks the sink closed; later events are logged and dropped.
pub struct ChannelSink {
    tx: Mutex<Option<mpsc::Sender<ComicEvent>>>,
    closed: AtomicBool,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ComicEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                tx: Mutex::new(Some(tx)),
                closed: AtomicBool::new(false),
            },
            rx,
        )
    }

    fn sender(&self) -> Option<mpsc::Sender<ComicEvent>> {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&self, event: ComicEvent) {
        if self.is_closed() {
            tracing::debug!(event = event.name(), "dropping event for closed stream");
            return;
        }
        let Some(tx) = self.sender() else {
            tracing::debug!(event = event.name(), "dropping event for closed stream");
            return;
        };
        if let Err(e) = tx.send(event).await {
            tracing::debug!(event = e.0.name(), "client disconnected, stream closed");
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let taken = self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
        if taken.is_some() {
            tracing::debug!("event stream closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Discards everything. Used by the non-streaming variant.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: ComicEvent) {}

    async fn close(&self) {}

    fn is_closed(&self) -> bool {
        false
    }
}
