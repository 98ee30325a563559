//! Transport layer abstraction.
//!
//! The sync orchestrator talks to the server through this trait; the
//! actual connection (framing, handshake, reconnection timers) lives
//! outside this crate. On reconnect an implementation is expected to
//! deliver a fresh full snapshot, which subsumes any stale in-flight
//! batches.

use crate::error::SyncResult;
use crate::protocol::ConnectionError;
use async_trait::async_trait;
use tabula_types::{Entity, RequestId, Update};

/// An event delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A connection attempt is underway.
    Connecting,
    /// The connection is established; sends are now permitted.
    Connected,
    /// The full authoritative board state, delivered on (re)connection.
    InitialState(Vec<Entity>),
    /// An authoritative entity delta: an ack when `request_id` is one of
    /// ours, an unsolicited push otherwise.
    TokenUpdate {
        request_id: Option<RequestId>,
        entities: Vec<Entity>,
    },
    /// The connection closed, with a categorized reason.
    Disconnected(ConnectionError),
    /// The server rejected a request, or an inbound message could not be
    /// decoded; `raw` carries the offending payload or message.
    Error {
        request_id: Option<RequestId>,
        raw: String,
    },
}

/// A connection to the authoritative board server.
#[async_trait]
pub trait BoardTransport: Send {
    /// Sends a batch of updates tagged with a request id.
    ///
    /// Fails with [`SyncError::NotConnected`](crate::SyncError) before a
    /// successful connection event.
    async fn send(&mut self, request_id: RequestId, updates: Vec<Update>) -> SyncResult<()>;

    /// Delivers the next event. Returns `None` when the transport is
    /// gone for good (session reset).
    async fn next_event(&mut self) -> Option<TransportEvent>;
}

/// A mock transport for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Scripts events into a [`MockTransport`] and observes what it sent.
    #[derive(Debug, Clone)]
    pub struct MockController {
        events: mpsc::UnboundedSender<TransportEvent>,
        sent: Arc<Mutex<VecDeque<(RequestId, Vec<Update>)>>>,
    }

    impl MockController {
        /// Delivers an event to the transport's consumer.
        pub fn push_event(&self, event: TransportEvent) {
            let _ = self.events.send(event);
        }

        /// Takes the oldest captured send, if any.
        pub fn take_sent(&self) -> Option<(RequestId, Vec<Update>)> {
            self.sent.lock().unwrap().pop_front()
        }

        /// Number of captured sends.
        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    /// Queue-backed transport: events arrive from the controller, sends
    /// are captured for inspection. Tracks connectedness from the events
    /// it delivers.
    #[derive(Debug)]
    pub struct MockTransport {
        events: mpsc::UnboundedReceiver<TransportEvent>,
        sent: Arc<Mutex<VecDeque<(RequestId, Vec<Update>)>>>,
        connected: bool,
    }

    impl MockTransport {
        /// Creates a transport and its controller.
        pub fn pair() -> (Self, MockController) {
            let (tx, rx) = mpsc::unbounded_channel();
            let sent = Arc::new(Mutex::new(VecDeque::new()));
            let transport = Self {
                events: rx,
                sent: sent.clone(),
                connected: false,
            };
            let controller = MockController { events: tx, sent };
            (transport, controller)
        }
    }

    #[async_trait]
    impl BoardTransport for MockTransport {
        async fn send(&mut self, request_id: RequestId, updates: Vec<Update>) -> SyncResult<()> {
            if !self.connected {
                return Err(SyncError::NotConnected);
            }
            self.sent.lock().unwrap().push_back((request_id, updates));
            Ok(())
        }

        async fn next_event(&mut self) -> Option<TransportEvent> {
            let event = self.events.recv().await;
            match &event {
                Some(TransportEvent::Connected) => self.connected = true,
                Some(TransportEvent::Disconnected(_)) => self.connected = false,
                _ => {}
            }
            event
        }
    }
}
