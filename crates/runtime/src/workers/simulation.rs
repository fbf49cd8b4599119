//! Simulation worker that owns the authoritative [`game_core::WorldState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), queues
//! actions until the next tick, dispatches them through
//! [`game_core::GameEngine`] one at a time, and publishes the outcomes on the
//! [`EventBus`].

use std::collections::{BTreeMap, VecDeque};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use game_core::{
    ActionErrorKind, ActionFlags, ActionRegistry, ActionResult, CommandFlags, Dispatch,
    DispatchContext, DispatchPhase, ErrorDetail, GameAction, GameEngine, GameError, PeerId,
    StringId, WorldState, describe_action, encode_action,
};

use crate::api::{ReceiveOutcome, Result, RuntimeError};
use crate::events::{
    ActionRef, Event, EventBus, EventBusUi, GameStateEvent, NetworkEvent, TickReport,
};
use crate::repository::{FileActionLog, RepositoryError};
use crate::runtime::RuntimeConfig;
use crate::utils::hash::{short_checksum, world_checksum};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Queue a local action. `accepted` receives the assigned network id
    /// immediately; `dispatched` receives the outcome at the next tick.
    Submit {
        action: Box<dyn GameAction>,
        accepted: oneshot::Sender<u32>,
        dispatched: oneshot::Sender<Dispatch>,
    },
    /// Decode and queue a packet from a connected peer.
    Receive {
        peer: PeerId,
        packet: Vec<u8>,
        reply: oneshot::Sender<Result<ReceiveOutcome>>,
    },
    ConnectPeer {
        peer: PeerId,
        protocol_version: u32,
        privileged: bool,
        reply: oneshot::Sender<Result<()>>,
    },
    DisconnectPeer {
        peer: PeerId,
        reply: oneshot::Sender<bool>,
    },
    /// Drain the queue and advance the clock.
    Tick {
        reply: oneshot::Sender<Result<TickReport>>,
    },
    /// Policy check and query only.
    Preview {
        action: Box<dyn GameAction>,
        reply: oneshot::Sender<ActionResult>,
    },
    /// Query the current world (read-only).
    QueryWorld { reply: oneshot::Sender<WorldState> },
}

/// Action waiting for the next tick.
struct Queued {
    action: Box<dyn GameAction>,
    ctx: DispatchContext,
    reply: Option<oneshot::Sender<Dispatch>>,
}

#[derive(Clone, Copy, Debug)]
struct PeerSession {
    privileged: bool,
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    world: WorldState,
    config: RuntimeConfig,
    registry: &'static ActionRegistry,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    action_log: Option<FileActionLog>,
    /// Append failure waiting to be reported by the next tick.
    log_failure: Option<RepositoryError>,
    peers: BTreeMap<PeerId, PeerSession>,
    queue: VecDeque<Queued>,
    next_network_id: u32,
}

impl SimulationWorker {
    pub fn new(
        world: WorldState,
        config: RuntimeConfig,
        registry: &'static ActionRegistry,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        action_log: Option<FileActionLog>,
    ) -> Self {
        info!(
            tick = world.clock.tick,
            banners = world.banners.iter().count(),
            logging = action_log.is_some(),
            "SimulationWorker initialized"
        );

        Self {
            world,
            config,
            registry,
            command_rx,
            event_bus,
            action_log,
            log_failure: None,
            peers: BTreeMap::new(),
            queue: VecDeque::new(),
            next_network_id: 1,
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }

        if let Some(log) = self.action_log.as_mut()
            && let Err(error) = log.flush()
        {
            warn!(%error, "Failed to flush action log on shutdown");
        }
        info!(tick = self.world.clock.tick, "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Submit {
                action,
                accepted,
                dispatched,
            } => {
                let network_id = self.enqueue_local(action, dispatched);
                if accepted.send(network_id).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::Receive {
                peer,
                packet,
                reply,
            } => {
                let outcome = self.receive(peer, &packet);
                if reply.send(outcome).is_err() {
                    debug!("Receive reply channel closed (caller dropped)");
                }
            }
            Command::ConnectPeer {
                peer,
                protocol_version,
                privileged,
                reply,
            } => {
                let result = self.connect_peer(peer, protocol_version, privileged);
                if reply.send(result).is_err() {
                    debug!("ConnectPeer reply channel closed (caller dropped)");
                }
            }
            Command::DisconnectPeer { peer, reply } => {
                let removed = self.peers.remove(&peer).is_some();
                if removed {
                    info!(%peer, "Peer disconnected");
                }
                if reply.send(removed).is_err() {
                    debug!("DisconnectPeer reply channel closed (caller dropped)");
                }
            }
            Command::Tick { reply } => {
                let report = self.tick();
                if reply.send(report).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::Preview { action, reply } => {
                let ctx = self.local_context();
                let result = GameEngine::new(&mut self.world).query(action.as_ref(), &ctx);
                if reply.send(result).is_err() {
                    debug!("Preview reply channel closed (caller dropped)");
                }
            }
            Command::QueryWorld { reply } => {
                if reply.send(self.world.clone()).is_err() {
                    debug!("QueryWorld reply channel closed (caller dropped)");
                }
            }
        }
    }

    fn local_context(&self) -> DispatchContext {
        DispatchContext::local().with_editor_mode(self.config.game_config.editor_mode)
    }

    fn enqueue_local(
        &mut self,
        mut action: Box<dyn GameAction>,
        reply: oneshot::Sender<Dispatch>,
    ) -> u32 {
        let network_id = self.next_network_id;
        self.next_network_id = self.next_network_id.wrapping_add(1).max(1);

        let envelope = action.envelope_mut();
        envelope.network_id = network_id;
        envelope.player_id = 0;
        let command_flags = envelope.command_flags;

        let ctx = self.local_context();
        if command_flags.contains(CommandFlags::GHOST) {
            // Ghosts only preview; the authoritative world is never touched.
            let result = GameEngine::new(&mut self.world).query(action.as_ref(), &ctx);
            let phase = if result.is_ok() {
                DispatchPhase::Validated
            } else {
                DispatchPhase::Rejected
            };
            debug!(network_id, phase = phase.as_str(), "Previewed ghost action");
            if reply.send(Dispatch { phase, result }).is_err() {
                debug!("Dispatch reply channel closed (caller dropped)");
            }
            return network_id;
        }
        if let Some(rejection) = reject_command_flags(command_flags) {
            if reply
                .send(Dispatch {
                    phase: DispatchPhase::Rejected,
                    result: rejection,
                })
                .is_err()
            {
                debug!("Dispatch reply channel closed (caller dropped)");
            }
            return network_id;
        }

        self.queue.push_back(Queued {
            action,
            ctx,
            reply: Some(reply),
        });
        network_id
    }

    fn connect_peer(&mut self, peer: PeerId, protocol_version: u32, privileged: bool) -> Result<()> {
        let expected = self.config.protocol_version;
        if protocol_version != expected {
            warn!(%peer, expected, actual = protocol_version, "Refusing peer");
            self.event_bus
                .publish(Event::Network(NetworkEvent::PeerRefused {
                    peer,
                    protocol_version,
                }));
            return Err(RuntimeError::ProtocolMismatch {
                peer,
                expected,
                actual: protocol_version,
            });
        }
        if self.peers.contains_key(&peer) {
            return Err(RuntimeError::PeerAlreadyConnected { peer });
        }

        self.peers.insert(peer, PeerSession { privileged });
        info!(%peer, privileged, "Peer connected");
        Ok(())
    }

    fn receive(&mut self, peer: PeerId, packet: &[u8]) -> Result<ReceiveOutcome> {
        let session = *self
            .peers
            .get(&peer)
            .ok_or(RuntimeError::PeerNotConnected { peer })?;

        let action = match self.registry.decode(packet) {
            Ok(action) => action,
            Err(error) => {
                warn!(
                    %peer,
                    code = error.error_code(),
                    len = packet.len(),
                    "Dropping malformed packet: {error}"
                );
                return Ok(ReceiveOutcome::Rejected(ActionResult::from(error)));
            }
        };

        let envelope = *action.envelope();
        if let Some(rejection) = reject_command_flags(envelope.command_flags) {
            warn!(
                %peer,
                network_id = envelope.network_id,
                flags = envelope.command_flags.bits(),
                "Dropping remote action with local-only command flags"
            );
            return Ok(ReceiveOutcome::Rejected(rejection));
        }

        let network_id = envelope.network_id;
        let ctx = DispatchContext::remote(peer, session.privileged)
            .with_editor_mode(self.config.game_config.editor_mode);
        self.queue.push_back(Queued {
            action,
            ctx,
            reply: None,
        });
        debug!(%peer, network_id, queued = self.queue.len(), "Queued remote action");
        Ok(ReceiveOutcome::Queued { network_id })
    }

    fn tick(&mut self) -> Result<TickReport> {
        let tick = self.world.clock.tick;
        let mut dispatched = 0;
        let mut committed = 0;

        while let Some(queued) = self.queue.pop_front() {
            dispatched += 1;
            if self.dispatch(queued, tick) {
                committed += 1;
            }
        }

        let advanced = self.world.clock.advance();
        if let Some(log) = self.action_log.as_mut() {
            log.flush()?;
        }
        if let Some(failure) = self.log_failure.take() {
            return Err(failure.into());
        }

        let checksum = world_checksum(&self.world)?;
        debug!(
            tick = self.world.clock.tick,
            dispatched,
            committed,
            checksum = short_checksum(&checksum),
            "Tick completed"
        );

        let report = TickReport {
            tick: self.world.clock.tick,
            advanced,
            dispatched,
            committed,
            checksum,
        };
        self.event_bus
            .publish(Event::GameState(GameStateEvent::TickCompleted(report.clone())));
        Ok(report)
    }

    /// Dispatches one queued action to completion. Returns whether it
    /// committed.
    fn dispatch(&mut self, queued: Queued, tick: u64) -> bool {
        let Queued {
            mut action,
            ctx,
            reply,
        } = queued;

        let dispatch = {
            let mut ui = EventBusUi::new(&self.event_bus);
            GameEngine::new(&mut self.world).execute(action.as_ref(), &ctx, &mut ui)
        };

        let envelope = *action.envelope();
        let action_ref = ActionRef {
            action_type: action.action_type(),
            name: self
                .registry
                .name(action.action_type())
                .unwrap_or("unregistered"),
            network_id: envelope.network_id,
            player_id: envelope.player_id,
            origin: ctx.origin,
            tick,
        };

        let committed = dispatch.is_committed();
        if committed {
            self.publish_committed(action.as_mut(), action_ref);
        } else {
            let event = match dispatch.phase {
                DispatchPhase::Failed => GameStateEvent::ActionFailed {
                    action: action_ref,
                    result: dispatch.result.clone(),
                },
                _ => GameStateEvent::ActionRejected {
                    action: action_ref,
                    result: dispatch.result.clone(),
                },
            };
            self.event_bus.publish(Event::GameState(event));
        }

        if let Some(peer) = ctx.origin.peer() {
            self.event_bus
                .publish(Event::Network(NetworkEvent::Acknowledge {
                    peer,
                    network_id: envelope.network_id,
                    status: dispatch.result.status(),
                }));
        }

        if let Some(reply) = reply
            && reply.send(dispatch).is_err()
        {
            debug!("Dispatch reply channel closed (caller dropped)");
        }
        committed
    }

    fn publish_committed(&mut self, action: &mut dyn GameAction, action_ref: ActionRef) {
        let description = describe_action(action).unwrap_or_default();
        if !action.flags().contains(ActionFlags::CLIENT_ONLY) {
            match encode_action(action) {
                Ok(packet) => {
                    if let Some(log) = self.action_log.as_mut()
                        && let Err(failure) = log.append(action_ref.tick, &packet)
                    {
                        error!(
                            error = %failure,
                            network_id = action_ref.network_id,
                            "Action log write failed, logging disabled"
                        );
                        self.action_log = None;
                        self.log_failure = Some(failure);
                    }
                    self.event_bus
                        .publish(Event::Network(NetworkEvent::Broadcast {
                            exclude: action_ref.origin.peer(),
                            packet,
                        }));
                }
                Err(error) => {
                    warn!(%error, network_id = action_ref.network_id, "Failed to encode committed action");
                }
            }
        }

        self.event_bus
            .publish(Event::GameState(GameStateEvent::ActionCommitted {
                action: action_ref,
                description,
            }));
    }
}

/// Rejects envelopes carrying flags that only this process may set.
fn reject_command_flags(flags: CommandFlags) -> Option<ActionResult> {
    let local_only = flags & (CommandFlags::GHOST | CommandFlags::REPLAY);
    if local_only.is_empty() {
        return None;
    }
    Some(
        ActionResult::error(ActionErrorKind::InvalidParameters, StringId::NONE).with_detail(
            ErrorDetail::Parameter {
                name: "command_flags",
                value: i64::from(local_only.bits()),
            },
        ),
    )
}
