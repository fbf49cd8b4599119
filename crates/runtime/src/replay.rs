//! Rebuilds a world from a committed action log.
//!
//! Records are decoded through the registry, marked as replays, and
//! dispatched through [`GameEngine`] in log order. Replays are neither logged
//! again nor broadcast.
//!
//! The clock follows the records: it is set to each record's tick before
//! dispatch and advanced once after the last one, the same way the live
//! session ends the tick. Ticks after the last committed action leave no
//! record and are not reproduced.

use tracing::{debug, warn};

use game_core::{
    ActionRegistry, ActionResult, ActionType, CommandFlags, Dispatch, DispatchContext,
    DispatchPhase, GameEngine, UiContext, WorldState,
};

use crate::repository::{ActionLogRecord, Result};

/// Outcome of one replayed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayStep {
    /// Tick the record was originally committed in.
    pub tick: u64,
    /// `None` if the packet could not be decoded.
    pub action_type: Option<ActionType>,
    pub dispatch: Dispatch,
}

/// Replays `records` onto `world`.
///
/// Stops at the first repository error (for example a truncated tail) and
/// returns it; records before it have already been applied. Packets that no
/// longer decode are reported as rejected steps and skipped.
pub fn replay<I>(
    records: I,
    registry: &ActionRegistry,
    world: &mut WorldState,
    ui: &mut dyn UiContext,
) -> Result<Vec<ReplayStep>>
where
    I: IntoIterator<Item = Result<ActionLogRecord>>,
{
    // Logged actions already passed the session policy once.
    let ctx = DispatchContext::replay().with_editor_mode(true);
    let mut steps = Vec::new();

    for record in records {
        let record = record?;
        world.clock.tick = record.tick;
        let step = match registry.decode(&record.packet) {
            Ok(mut action) => {
                action.envelope_mut().command_flags |= CommandFlags::REPLAY;
                let action_type = action.action_type();
                let dispatch = GameEngine::new(world).execute(action.as_ref(), &ctx, ui);
                if !dispatch.is_committed() {
                    warn!(
                        tick = record.tick,
                        action_type = %action_type,
                        phase = %dispatch.phase,
                        "Replayed action did not commit"
                    );
                }
                ReplayStep {
                    tick: record.tick,
                    action_type: Some(action_type),
                    dispatch,
                }
            }
            Err(error) => {
                warn!(tick = record.tick, %error, "Skipping undecodable log record");
                ReplayStep {
                    tick: record.tick,
                    action_type: None,
                    dispatch: Dispatch {
                        phase: DispatchPhase::Rejected,
                        result: ActionResult::from(error),
                    },
                }
            }
        };
        steps.push(step);
    }

    if !steps.is_empty() {
        world.clock.advance();
    }
    debug!(steps = steps.len(), tick = world.clock.tick, "Replay finished");
    Ok(steps)
}
