//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! submitting actions, feeding peer traffic, advancing ticks, and streaming
//! events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{ActionResult, Dispatch, GameAction, PeerId, WorldState};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, TickReport, Topic};
use crate::workers::Command;

/// What happened to a packet handed to [`RuntimeHandle::receive_packet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Decoded and queued for the next tick.
    Queued { network_id: u32 },
    /// Could not be decoded; never queued.
    Rejected(ActionResult),
}

/// A submitted action awaiting the tick that dispatches it.
#[derive(Debug)]
pub struct PendingDispatch {
    network_id: u32,
    reply: oneshot::Receiver<Dispatch>,
}

impl PendingDispatch {
    /// Network id assigned at submission.
    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// Waits for the dispatch outcome.
    pub async fn outcome(self) -> Result<Dispatch> {
        self.reply.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: Command, reply_rx: oneshot::Receiver<T>) -> Result<T> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Queues a local action for the next tick.
    ///
    /// The returned [`PendingDispatch`] resolves once that tick has run.
    /// `GHOST` actions are only previewed and resolve immediately.
    pub async fn submit(&self, action: Box<dyn GameAction>) -> Result<PendingDispatch> {
        let (accepted_tx, accepted_rx) = oneshot::channel();
        let (dispatched_tx, dispatched_rx) = oneshot::channel();

        let network_id = self
            .request(
                Command::Submit {
                    action,
                    accepted: accepted_tx,
                    dispatched: dispatched_tx,
                },
                accepted_rx,
            )
            .await?;

        Ok(PendingDispatch {
            network_id,
            reply: dispatched_rx,
        })
    }

    /// Hands over a packet received from a connected peer.
    pub async fn receive_packet(&self, peer: PeerId, packet: Vec<u8>) -> Result<ReceiveOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(
            Command::Receive {
                peer,
                packet,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await?
    }

    /// Registers a peer after checking its protocol version.
    pub async fn connect_peer(
        &self,
        peer: PeerId,
        protocol_version: u32,
        privileged: bool,
    ) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(
            Command::ConnectPeer {
                peer,
                protocol_version,
                privileged,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await?
    }

    /// Forgets a peer. Its queued actions still run.
    pub async fn disconnect_peer(&self, peer: PeerId) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(
            Command::DisconnectPeer {
                peer,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    /// Dispatches every queued action in arrival order, then advances the
    /// clock unless paused.
    ///
    /// Fails with [`RuntimeError::Repository`] if the action log could not be
    /// written during this tick; logging stays off afterwards.
    pub async fn tick(&self) -> Result<TickReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(Command::Tick { reply: reply_tx }, reply_rx)
            .await?
    }

    /// Validates an action against the current world without executing it.
    pub async fn preview(&self, action: Box<dyn GameAction>) -> Result<ActionResult> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(
            Command::Preview {
                action,
                reply: reply_tx,
            },
            reply_rx,
        )
        .await
    }

    /// Query the current world (read-only snapshot)
    pub async fn query_world(&self) -> Result<WorldState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(Command::QueryWorld { reply: reply_tx }, reply_rx)
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::GameState` - Dispatch outcomes and tick reports
    /// - `Topic::Ui` - Redraw regions and intents
    /// - `Topic::Network` - Outbound packets and acknowledgements
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut game_rx = handle.subscribe(Topic::GameState);
    /// while let Ok(event) = game_rx.recv().await {
    ///     // Handle game state events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }
}
