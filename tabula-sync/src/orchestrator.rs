//! Sync orchestrator — drives the engine from a tokio task.
//!
//! All mutation happens on one logical timeline: user commands, the
//! throttle deadline, and transport events are multiplexed through a
//! single `select!` loop, so the two indexes are never touched from two
//! threads of control. Dropping the handle (or an explicit shutdown)
//! tears down the task, merge state and transport together; nothing
//! leaks across sessions.

use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::index::EntityIndex;
use crate::transport::{BoardTransport, TransportEvent};
use tabula_types::Action;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A command for the orchestrator task.
#[derive(Debug, Clone)]
pub enum SyncCommand {
    /// Apply a local user edit.
    Apply(Action),
    /// Tear the session down.
    Shutdown,
}

/// Handle to a running orchestrator.
///
/// Cloneable; dropping every clone ends the session.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::UnboundedSender<SyncCommand>,
    snapshots: watch::Receiver<EntityIndex>,
}

impl OrchestratorHandle {
    /// Applies a local action. The change is visible in the next
    /// published snapshot and flushed on the next throttle tick.
    pub fn apply(&self, action: Action) -> SyncResult<()> {
        self.commands
            .send(SyncCommand::Apply(action))
            .map_err(|_| SyncError::ChannelClosed)
    }

    /// The current local view, for rendering.
    #[must_use]
    pub fn snapshot(&self) -> EntityIndex {
        self.snapshots.borrow().clone()
    }

    /// Subscribes to local-view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EntityIndex> {
        self.snapshots.clone()
    }

    /// Ends the session.
    pub fn shutdown(&self) {
        let _ = self.commands.send(SyncCommand::Shutdown);
    }
}

/// Spawns the orchestrator task on the current runtime and returns its
/// handle.
pub fn spawn_orchestrator<T>(transport: T, config: SyncConfig) -> OrchestratorHandle
where
    T: BoardTransport + 'static,
{
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(EntityIndex::new());

    let orchestrator = SyncOrchestrator {
        engine: SyncEngine::new(),
        transport,
        commands: command_rx,
        snapshots: snapshot_tx,
        config,
        connected: false,
        last_flush: Instant::now(),
        flush_deadline: None,
    };
    tokio::spawn(orchestrator.run());

    OrchestratorHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
    }
}

struct SyncOrchestrator<T> {
    engine: SyncEngine,
    transport: T,
    commands: mpsc::UnboundedReceiver<SyncCommand>,
    snapshots: watch::Sender<EntityIndex>,
    config: SyncConfig,
    connected: bool,
    last_flush: Instant,
    flush_deadline: Option<Instant>,
}

impl<T: BoardTransport> SyncOrchestrator<T> {
    async fn run(mut self) {
        loop {
            let deadline = self.flush_deadline.unwrap_or_else(Instant::now);
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SyncCommand::Apply(action)) => {
                        self.engine.apply_local_action(action);
                        self.publish();
                        self.schedule_flush();
                    }
                    Some(SyncCommand::Shutdown) | None => {
                        debug!("session ended, shutting down");
                        break;
                    }
                },
                event = self.transport.next_event() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("transport gone, shutting down");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline), if self.flush_deadline.is_some() => {
                    self.flush().await;
                }
            }
        }
    }

    /// Schedules the next flush no earlier than one throttle interval
    /// after the previous one, coalescing rapid edits into one batch.
    fn schedule_flush(&mut self) {
        if self.flush_deadline.is_none() {
            let earliest = self.last_flush + self.config.throttle;
            self.flush_deadline = Some(earliest.max(Instant::now()));
        }
    }

    async fn flush(&mut self) {
        self.flush_deadline = None;
        self.last_flush = Instant::now();
        if !self.connected {
            // Edits keep accumulating; a flush is rescheduled once the
            // transport reports a connection.
            return;
        }
        if let Some(outcome) = self.engine.flush() {
            if let Err(error) = self
                .transport
                .send(outcome.request_id, outcome.updates)
                .await
            {
                warn!(request_id = %outcome.request_id, %error, "failed to send batch");
            }
        }
    }

    fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connecting => debug!("transport connecting"),
            TransportEvent::Connected => {
                info!("transport connected");
                self.connected = true;
                if self.engine.has_pending_changes() {
                    self.schedule_flush();
                }
            }
            TransportEvent::InitialState(entities) => {
                self.engine.handle_initial_state(entities);
                self.publish();
            }
            TransportEvent::TokenUpdate {
                request_id,
                entities,
            } => {
                self.engine.handle_token_update(request_id.as_ref(), entities);
                self.publish();
            }
            TransportEvent::Error {
                request_id: Some(request_id),
                raw,
            } => {
                warn!(%request_id, %raw, "server rejected batch");
                self.engine.handle_rejection(&request_id);
                self.publish();
            }
            TransportEvent::Error {
                request_id: None,
                raw,
            } => {
                // Malformed inbound payloads land here; neither index
                // is mutated.
                warn!(%raw, "server reported error");
            }
            TransportEvent::Disconnected(reason) => {
                warn!(%reason, "transport disconnected");
                self.connected = false;
            }
        }
    }

    fn publish(&self) {
        let _ = self.snapshots.send(self.engine.state().local().clone());
    }
}
