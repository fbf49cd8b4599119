use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use game_core::state::{Banner, WallElement, WallEntry};
use game_core::{
    ActionErrorKind, ActionRegistry, ActionStatus, BannerIndex, BannerSetColourAction,
    BannerSetNameAction, CommandFlags, Direction, DispatchPhase, GameAction, IntentAction, NullUi, Origin,
    PauseToggleAction, PeerId, SignSetStyleAction, TileCoords, TileElement, TileElementKind,
    WorldState, encode_action,
};
use runtime::{
    ACTION_LOG_FILE, ActionLogReader, Event, GameStateEvent, NetworkEvent, ReceiveOutcome,
    Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, Topic, UiEvent, replay,
};
use runtime::utils::hash::world_checksum;

const SIGN: BannerIndex = BannerIndex(7);
const SIGN_TILE: TileCoords = TileCoords::new(3, 3);
const PEER: PeerId = PeerId(9);

/// A small world with one scrolling wall sign.
fn sign_world() -> WorldState {
    let mut world = WorldState::new(8, 8).unwrap();
    let entry = world.scenery.add_wall(WallEntry {
        name: "scrolling wall sign".into(),
        scrolling_mode: Some(0),
    });
    world
        .tiles
        .push_element(
            SIGN_TILE,
            TileElement::new(
                2,
                6,
                Direction::NORTH,
                TileElementKind::Wall(WallElement {
                    entry,
                    primary_colour: 0,
                    secondary_colour: 0,
                    banner_index: Some(SIGN),
                }),
            ),
        )
        .unwrap();
    world.banners.insert(SIGN, Banner::new(SIGN_TILE)).unwrap();
    world
}

fn wall_colours(world: &WorldState) -> (u8, u8) {
    let wall = world
        .tiles
        .elements_at(SIGN_TILE)
        .iter()
        .find_map(TileElement::as_wall)
        .unwrap();
    (wall.primary_colour, wall.secondary_colour)
}

async fn start(world: WorldState) -> Runtime {
    Runtime::builder()
        .initial_world(world)
        .build()
        .await
        .expect("runtime should start")
}

/// Everything published so far on one topic.
fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn connect(handle: &RuntimeHandle, privileged: bool) {
    handle
        .connect_peer(PEER, RuntimeConfig::default().protocol_version, privileged)
        .await
        .unwrap();
}

fn packet(mut action: impl GameAction, network_id: u32) -> Vec<u8> {
    action.envelope_mut().network_id = network_id;
    encode_action(&mut action).unwrap()
}

#[tokio::test]
async fn local_sign_style_commits_and_broadcasts() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut game_rx = handle.subscribe(Topic::GameState);
    let mut ui_rx = handle.subscribe(Topic::Ui);
    let mut net_rx = handle.subscribe(Topic::Network);

    let pending = handle
        .submit(Box::new(SignSetStyleAction::new(i32::from(SIGN.0), 5, 2, false)))
        .await
        .unwrap();
    assert_eq!(pending.network_id(), 1);

    let report = handle.tick().await.unwrap();
    assert_eq!((report.dispatched, report.committed), (1, 1));
    assert!(report.advanced);
    assert_eq!(report.tick, 1);

    let dispatch = timeout(Duration::from_secs(1), pending.outcome())
        .await
        .unwrap()
        .unwrap();
    assert!(dispatch.is_committed());
    assert_eq!(wall_colours(&handle.query_world().await.unwrap()), (5, 2));

    let game_events = drain(&mut game_rx);
    assert!(matches!(
        &game_events[0],
        Event::GameState(GameStateEvent::ActionCommitted { action, description })
            if action.name == "sign_set_style"
                && action.origin == Origin::Local
                && description.contains("main_colour=5")
    ));
    assert!(matches!(
        game_events.last(),
        Some(Event::GameState(GameStateEvent::TickCompleted(_)))
    ));

    let ui_events = drain(&mut ui_rx);
    assert!(
        ui_events
            .iter()
            .any(|event| matches!(event, Event::Ui(UiEvent::Invalidate(_))))
    );
    let intents: Vec<_> = ui_events
        .iter()
        .filter_map(|event| match event {
            Event::Ui(UiEvent::Intent(intent)) => Some(intent),
            _ => None,
        })
        .collect();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].action, IntentAction::UpdateBanner);

    let net_events = drain(&mut net_rx);
    let Some(Event::Network(NetworkEvent::Broadcast { exclude, packet })) = net_events.first()
    else {
        panic!("expected a broadcast, got {net_events:?}");
    };
    assert_eq!(*exclude, None);
    let decoded = ActionRegistry::global().decode(packet).unwrap();
    let decoded = decoded
        .as_any()
        .downcast_ref::<SignSetStyleAction>()
        .unwrap();
    assert_eq!((decoded.main_colour, decoded.text_colour), (5, 2));
    assert_eq!(decoded.envelope.network_id, 1);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_action_leaves_the_world_alone() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut net_rx = handle.subscribe(Topic::Network);
    let before = handle.query_world().await.unwrap();

    let pending = handle
        .submit(Box::new(SignSetStyleAction::new(-1, 5, 2, false)))
        .await
        .unwrap();
    let report = handle.tick().await.unwrap();
    assert_eq!((report.dispatched, report.committed), (1, 0));

    let dispatch = pending.outcome().await.unwrap();
    assert_eq!(dispatch.phase, DispatchPhase::Rejected);
    assert_eq!(
        dispatch.result.error_kind(),
        Some(ActionErrorKind::InvalidParameters)
    );

    let after = handle.query_world().await.unwrap();
    assert_eq!(after.tiles, before.tiles);
    assert_eq!(after.banners, before.banners);
    assert!(drain(&mut net_rx).is_empty());
}

#[tokio::test]
async fn packets_from_unknown_peers_are_refused() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();

    let bytes = packet(BannerSetColourAction::new(i32::from(SIGN.0), 4), 1);
    let err = handle.receive_packet(PEER, bytes).await.unwrap_err();
    assert!(matches!(err, RuntimeError::PeerNotConnected { peer } if peer == PEER));
}

#[tokio::test]
async fn malformed_packets_are_never_queued() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    connect(&handle, false).await;

    let mut bytes = packet(BannerSetColourAction::new(i32::from(SIGN.0), 4), 1);
    bytes.push(0xAA);
    let outcome = handle.receive_packet(PEER, bytes).await.unwrap();
    let ReceiveOutcome::Rejected(result) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(result.error_kind(), Some(ActionErrorKind::DecodeFailure));

    let outcome = handle.receive_packet(PEER, vec![1, 2]).await.unwrap();
    assert!(matches!(outcome, ReceiveOutcome::Rejected(_)));

    let report = handle.tick().await.unwrap();
    assert_eq!(report.dispatched, 0);
}

#[tokio::test]
async fn remote_ghost_and_replay_flags_are_refused() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut net_rx = handle.subscribe(Topic::Network);
    connect(&handle, true).await;
    let before = handle.query_world().await.unwrap();

    for flags in [CommandFlags::GHOST, CommandFlags::REPLAY] {
        let mut action = SignSetStyleAction::new(i32::from(SIGN.0), 5, 2, false);
        action.envelope.command_flags = flags;
        let outcome = handle.receive_packet(PEER, packet(action, 11)).await.unwrap();
        let ReceiveOutcome::Rejected(result) = outcome else {
            panic!("expected rejection for {flags:?}, got {outcome:?}");
        };
        assert_eq!(
            result.error_kind(),
            Some(ActionErrorKind::InvalidParameters)
        );
    }

    let report = handle.tick().await.unwrap();
    assert_eq!(report.dispatched, 0);
    let after = handle.query_world().await.unwrap();
    assert_eq!(wall_colours(&after), wall_colours(&before));
    assert!(
        !drain(&mut net_rx)
            .iter()
            .any(|event| matches!(event, Event::Network(NetworkEvent::Broadcast { .. })))
    );
}

#[tokio::test]
async fn local_ghost_previews_without_committing() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut game_rx = handle.subscribe(Topic::GameState);
    let mut net_rx = handle.subscribe(Topic::Network);

    let mut ghost = SignSetStyleAction::new(i32::from(SIGN.0), 5, 2, false);
    ghost.envelope.command_flags = CommandFlags::GHOST;
    let pending = handle.submit(Box::new(ghost)).await.unwrap();
    let dispatch = timeout(Duration::from_secs(1), pending.outcome())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dispatch.phase, DispatchPhase::Validated);
    assert!(dispatch.result.is_ok());

    let mut replayed = SignSetStyleAction::new(i32::from(SIGN.0), 6, 1, false);
    replayed.envelope.command_flags = CommandFlags::REPLAY;
    let pending = handle.submit(Box::new(replayed)).await.unwrap();
    let dispatch = pending.outcome().await.unwrap();
    assert_eq!(dispatch.phase, DispatchPhase::Rejected);

    let report = handle.tick().await.unwrap();
    assert_eq!((report.dispatched, report.committed), (0, 0));
    assert_eq!(wall_colours(&handle.query_world().await.unwrap()), (0, 0));
    assert!(drain(&mut net_rx).is_empty());
    assert!(!drain(&mut game_rx).iter().any(|event| matches!(
        event,
        Event::GameState(GameStateEvent::ActionCommitted { .. })
    )));
}

#[tokio::test]
async fn protocol_mismatch_refuses_the_peer() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut net_rx = handle.subscribe(Topic::Network);
    let expected = RuntimeConfig::default().protocol_version;

    let err = handle
        .connect_peer(PEER, expected + 1, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::ProtocolMismatch { expected: e, actual, .. } if e == expected && actual == expected + 1
    ));
    assert!(matches!(
        drain(&mut net_rx).as_slice(),
        [Event::Network(NetworkEvent::PeerRefused { peer, .. })] if *peer == PEER
    ));

    connect(&handle, false).await;
    assert!(matches!(
        handle.connect_peer(PEER, expected, false).await,
        Err(RuntimeError::PeerAlreadyConnected { .. })
    ));
    assert!(handle.disconnect_peer(PEER).await.unwrap());
    assert!(!handle.disconnect_peer(PEER).await.unwrap());
}

#[tokio::test]
async fn remote_actions_are_acknowledged_and_forwarded_to_others() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut net_rx = handle.subscribe(Topic::Network);
    connect(&handle, false).await;

    let bytes = packet(BannerSetNameAction::new(i32::from(SIGN.0), "Log Flume"), 42);
    let outcome = handle.receive_packet(PEER, bytes.clone()).await.unwrap();
    assert_eq!(outcome, ReceiveOutcome::Queued { network_id: 42 });

    handle.tick().await.unwrap();

    let world = handle.query_world().await.unwrap();
    assert_eq!(world.banner(SIGN).unwrap().text(), Some("Log Flume"));

    let net_events = drain(&mut net_rx);
    assert!(net_events.iter().any(|event| matches!(
        event,
        Event::Network(NetworkEvent::Broadcast { exclude: Some(peer), packet })
            if *peer == PEER && *packet == bytes
    )));
    assert!(net_events.iter().any(|event| matches!(
        event,
        Event::Network(NetworkEvent::Acknowledge { peer, network_id: 42, status: ActionStatus::Ok })
            if *peer == PEER
    )));
}

#[tokio::test]
async fn unprivileged_peers_cannot_pause() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let mut net_rx = handle.subscribe(Topic::Network);
    connect(&handle, false).await;

    handle
        .receive_packet(PEER, packet(PauseToggleAction::default(), 3))
        .await
        .unwrap();
    let report = handle.tick().await.unwrap();
    assert!(report.advanced);
    assert!(!handle.query_world().await.unwrap().is_paused());

    assert!(drain(&mut net_rx).iter().any(|event| matches!(
        event,
        Event::Network(NetworkEvent::Acknowledge {
            network_id: 3,
            status: ActionStatus::Error(ActionErrorKind::InsufficientPermission),
            ..
        })
    )));
}

#[tokio::test]
async fn pause_gates_actions_until_resumed() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();

    handle
        .submit(Box::new(PauseToggleAction::default()))
        .await
        .unwrap();
    let report = handle.tick().await.unwrap();
    assert!(!report.advanced);
    assert_eq!(report.tick, 0);

    let blocked = handle
        .submit(Box::new(BannerSetColourAction::new(i32::from(SIGN.0), 4)))
        .await
        .unwrap();
    let allowed = handle
        .submit(Box::new(SignSetStyleAction::new(i32::from(SIGN.0), 6, 1, false)))
        .await
        .unwrap();
    handle.tick().await.unwrap();

    let blocked = blocked.outcome().await.unwrap();
    assert_eq!(
        blocked.result.error_kind(),
        Some(ActionErrorKind::GamePaused)
    );
    assert!(allowed.outcome().await.unwrap().is_committed());

    handle
        .submit(Box::new(PauseToggleAction::default()))
        .await
        .unwrap();
    let retry = handle
        .submit(Box::new(BannerSetColourAction::new(i32::from(SIGN.0), 4)))
        .await
        .unwrap();
    let report = handle.tick().await.unwrap();
    assert!(report.advanced);
    assert!(retry.outcome().await.unwrap().is_committed());
}

#[tokio::test]
async fn preview_does_not_mutate() {
    let runtime = start(sign_world()).await;
    let handle = runtime.handle();
    let before = handle.query_world().await.unwrap();

    let result = handle
        .preview(Box::new(SignSetStyleAction::new(i32::from(SIGN.0), 5, 2, false)))
        .await
        .unwrap();
    assert!(result.is_ok());

    let result = handle
        .preview(Box::new(BannerSetColourAction::new(i32::from(SIGN.0), 200)))
        .await
        .unwrap();
    assert_eq!(result.error_kind(), Some(ActionErrorKind::InvalidParameters));

    assert_eq!(handle.query_world().await.unwrap(), before);
}

#[tokio::test]
async fn action_log_replays_to_the_same_signs() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        action_log_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .initial_world(sign_world())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle
        .submit(Box::new(SignSetStyleAction::new(i32::from(SIGN.0), 9, 3, false)))
        .await
        .unwrap();
    handle
        .submit(Box::new(BannerSetNameAction::new(i32::from(SIGN.0), "Exit")))
        .await
        .unwrap();
    handle.tick().await.unwrap();
    // Rejected actions never reach the log.
    handle
        .submit(Box::new(BannerSetColourAction::new(99, 1)))
        .await
        .unwrap();
    handle.tick().await.unwrap();

    let live = handle.query_world().await.unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let reader = ActionLogReader::open(dir.path().join(ACTION_LOG_FILE)).unwrap();
    let mut world = sign_world();
    let steps = replay(reader, ActionRegistry::global(), &mut world, &mut NullUi).unwrap();

    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|step| step.dispatch.is_committed()));
    assert!(steps.iter().all(|step| step.tick == 0));
    assert_eq!(world.tiles, live.tiles);
    assert_eq!(world.banners, live.banners);
}

#[tokio::test]
async fn replayed_world_matches_the_live_checksum() {
    let dir = tempfile::tempdir().unwrap();
    let config = RuntimeConfig {
        action_log_dir: Some(dir.path().to_path_buf()),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .initial_world(sign_world())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle
        .submit(Box::new(SignSetStyleAction::new(i32::from(SIGN.0), 4, 1, false)))
        .await
        .unwrap();
    handle.tick().await.unwrap();
    handle
        .submit(Box::new(BannerSetColourAction::new(i32::from(SIGN.0), 6)))
        .await
        .unwrap();
    let report = handle.tick().await.unwrap();
    assert_eq!(report.tick, 2);
    drop(handle);
    runtime.shutdown().await.unwrap();

    let reader = ActionLogReader::open(dir.path().join(ACTION_LOG_FILE)).unwrap();
    let mut world = sign_world();
    replay(reader, ActionRegistry::global(), &mut world, &mut NullUi).unwrap();

    assert_eq!(world.clock.tick, report.tick);
    assert_eq!(world_checksum(&world).unwrap(), report.checksum);
}
