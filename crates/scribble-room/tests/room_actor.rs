//! Integration tests for the room actor.
//!
//! Every test runs on a paused clock: whenever all tasks are idle, Tokio
//! jumps straight to the next timer, so a 60-second round takes no real
//! time and the tick sequence is deterministic.

use std::time::Duration;

use scribble_protocol::{ClientEvent, Phase, PlayerId, Readiness, ServerEvent};
use scribble_room::{OUTBOUND_QUEUE_CAPACITY, Room, RoomConfig, RoomError, RoomHandle, spawn_room};
use tokio::sync::mpsc::{self, Receiver};
use tokio::time::Instant;

// =========================================================================
// Helpers
// =========================================================================

fn pid(n: u64) -> PlayerId {
    PlayerId(n)
}

fn cat_room() -> RoomHandle {
    let config = RoomConfig {
        vocabulary: vec!["cat".into()],
        ..RoomConfig::default()
    };
    spawn_room(Room::with_seed(config, 11))
}

/// Attaches a connection, joins it under `name`, and drains the welcome
/// snapshot and the join broadcast.
async fn seat(handle: &RoomHandle, id: u64, name: &str) -> Receiver<ServerEvent> {
    let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    handle.attach(pid(id), tx).await.unwrap();
    handle
        .submit(pid(id), ClientEvent::Join { username: name.into() })
        .await
        .unwrap();

    assert!(matches!(next(&mut rx).await, ServerEvent::RosterUpdate { .. }));
    assert!(matches!(next(&mut rx).await, ServerEvent::RoomState { .. }));
    assert!(matches!(next(&mut rx).await, ServerEvent::CanvasSnapshot { .. }));
    wait_for(&mut rx, |e| {
        matches!(e, ServerEvent::RosterUpdate { players } if players.iter().any(|p| p.id == pid(id)))
    })
    .await;
    rx
}

async fn next(rx: &mut Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("room dropped the channel")
}

async fn wait_for(
    rx: &mut Receiver<ServerEvent>,
    pred: impl Fn(&ServerEvent) -> bool,
) -> ServerEvent {
    loop {
        let event = next(rx).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Collects events up to and including the first one matching `pred`.
async fn collect_until(
    rx: &mut Receiver<ServerEvent>,
    pred: impl Fn(&ServerEvent) -> bool,
) -> Vec<ServerEvent> {
    let mut seen = Vec::new();
    loop {
        let event = next(rx).await;
        let done = pred(&event);
        seen.push(event);
        if done {
            return seen;
        }
    }
}

async fn ready_all(handle: &RoomHandle, ids: &[u64]) {
    for id in ids {
        handle.submit(pid(*id), ClientEvent::Ready).await.unwrap();
    }
}

fn is_round_start(e: &ServerEvent) -> bool {
    matches!(e, ServerEvent::RoundStart { .. })
}

fn is_round_end(e: &ServerEvent) -> bool {
    matches!(e, ServerEvent::RoundEnd { .. })
}

// =========================================================================
// Scenario A: a full round that runs out of time
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_full_round_times_out_and_reveals_word() {
    let room = cat_room();
    let mut ada = seat(&room, 1, "ada").await;
    let mut bo = seat(&room, 2, "bo").await;

    let start = Instant::now();
    ready_all(&room, &[1, 2]).await;

    let before_round = collect_until(&mut ada, is_round_start).await;
    let countdown: Vec<u32> = before_round
        .iter()
        .filter_map(|e| match e {
            ServerEvent::CountdownTick { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, [5, 4, 3, 2, 1, 0]);
    assert_eq!(start.elapsed(), Duration::from_secs(5));

    let Some(ServerEvent::RoundStart { drawer, duration, .. }) = before_round.last().cloned() else {
        panic!("expected round-start");
    };
    assert!([pid(1), pid(2)].contains(&drawer));
    assert_eq!(duration, 60);

    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Playing);
    assert_eq!(info.drawer, Some(drawer));

    let round = collect_until(&mut ada, is_round_end).await;
    let time_updates = round
        .iter()
        .filter(|e| matches!(e, ServerEvent::TimeUpdate { .. }))
        .count();
    assert_eq!(time_updates, 60);
    assert_eq!(start.elapsed(), Duration::from_secs(65));
    assert!(matches!(
        round.last(),
        Some(ServerEvent::RoundEnd { word, drawer: d, .. }) if word == "cat" && *d == drawer
    ));

    wait_for(&mut bo, is_round_end).await;
    let ServerEvent::RosterUpdate { players } =
        wait_for(&mut bo, |e| matches!(e, ServerEvent::RosterUpdate { .. })).await
    else {
        unreachable!()
    };
    assert!(players.iter().all(|p| p.status == Readiness::NotReady));

    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.drawer, None);
    assert!(!info.timer_armed);
    assert_eq!(info.timer_arms, 2, "one arm for the countdown, one for the round");
}

#[tokio::test(start_paused = true)]
async fn test_secret_word_reaches_only_the_drawer() {
    let room = cat_room();
    let mut ada = seat(&room, 1, "ada").await;
    let mut bo = seat(&room, 2, "bo").await;
    ready_all(&room, &[1, 2]).await;

    let ada_events = collect_until(&mut ada, is_round_end).await;
    let bo_events = collect_until(&mut bo, is_round_end).await;
    let drawer = room_drawer(&ada_events);

    let got_word = |events: &[ServerEvent]| {
        events
            .iter()
            .any(|e| matches!(e, ServerEvent::SecretWord { word } if word == "cat"))
    };
    assert_eq!(got_word(&ada_events), drawer == pid(1));
    assert_eq!(got_word(&bo_events), drawer == pid(2));
}

fn room_drawer(events: &[ServerEvent]) -> PlayerId {
    events
        .iter()
        .find_map(|e| match e {
            ServerEvent::RoundStart { drawer, .. } => Some(*drawer),
            _ => None,
        })
        .expect("a round-start")
}

// =========================================================================
// Scenario B: the drawer disconnects mid-round
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_drawer_disconnect_ends_round_immediately() {
    let room = cat_room();
    let mut rxs = vec![
        seat(&room, 1, "ada").await,
        seat(&room, 2, "bo").await,
        seat(&room, 3, "cy").await,
    ];
    ready_all(&room, &[1, 2, 3]).await;

    let ServerEvent::RoundStart { drawer, .. } = wait_for(&mut rxs[0], is_round_start).await else {
        unreachable!()
    };
    // Ten seconds into the round.
    tokio::time::sleep(Duration::from_secs(10)).await;

    let left_at = Instant::now();
    room.detach(drawer).await.unwrap();

    let watcher = (1..=3u64).find(|n| pid(*n) != drawer).unwrap();
    let rx = &mut rxs[(watcher - 1) as usize];
    let ServerEvent::RoundEnd { word, drawer: revealed, .. } = wait_for(rx, is_round_end).await else {
        unreachable!()
    };
    assert_eq!(word, "cat");
    assert_eq!(revealed, drawer);
    assert_eq!(left_at.elapsed(), Duration::ZERO, "the round must not wait for the timer");

    let ServerEvent::RosterUpdate { players } =
        wait_for(rx, |e| matches!(e, ServerEvent::RosterUpdate { .. })).await
    else {
        unreachable!()
    };
    assert_eq!(players.len(), 2);
    assert!(players.iter().all(|p| p.id != drawer));
    assert!(players.iter().all(|p| p.status == Readiness::NotReady));

    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert_eq!(info.player_count, 2);
    assert!(!info.timer_armed);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_during_countdown_cancels_it() {
    let room = cat_room();
    let mut ada = seat(&room, 1, "ada").await;
    let _bo = seat(&room, 2, "bo").await;
    ready_all(&room, &[1, 2]).await;
    wait_for(&mut ada, |e| matches!(e, ServerEvent::CountdownTick { remaining: 3 })).await;

    room.detach(pid(2)).await.unwrap();

    wait_for(&mut ada, |e| matches!(e, ServerEvent::CountdownCancelled)).await;
    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert!(!info.timer_armed);

    wait_for(&mut ada, |e| matches!(e, ServerEvent::RosterUpdate { .. })).await;

    // Nothing else happens, however long we wait.
    let quiet = tokio::time::timeout(Duration::from_secs(120), ada.recv()).await;
    assert!(quiet.is_err());
}

// =========================================================================
// Guessing and readiness through the actor
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_correct_guess_stops_the_round_timer() {
    let room = cat_room();
    let mut ada = seat(&room, 1, "ada").await;
    let mut bo = seat(&room, 2, "bo").await;
    ready_all(&room, &[1, 2]).await;

    let ServerEvent::RoundStart { drawer, .. } = wait_for(&mut ada, is_round_start).await else {
        unreachable!()
    };
    let guesser = if drawer == pid(1) { pid(2) } else { pid(1) };
    room.submit(guesser, ClientEvent::Guess { text: "CAT".into() })
        .await
        .unwrap();

    let ServerEvent::CorrectGuess { word, .. } =
        wait_for(&mut bo, |e| matches!(e, ServerEvent::CorrectGuess { .. })).await
    else {
        unreachable!()
    };
    assert_eq!(word, "cat");
    wait_for(&mut bo, is_round_end).await;

    // The round timer is gone: no further time updates arrive.
    let stray = tokio::time::timeout(
        Duration::from_secs(120),
        wait_for(&mut bo, |e| matches!(e, ServerEvent::TimeUpdate { .. })),
    )
    .await;
    assert!(stray.is_err());

    let info = room.info().await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
    assert!(!info.timer_armed);
}

#[tokio::test(start_paused = true)]
async fn test_toggling_readiness_during_countdown_yields_one_round() {
    let room = cat_room();
    let mut ada = seat(&room, 1, "ada").await;
    let _bo = seat(&room, 2, "bo").await;
    ready_all(&room, &[1, 2]).await;
    wait_for(&mut ada, |e| matches!(e, ServerEvent::CountdownTick { remaining: 4 })).await;

    for _ in 0..3 {
        room.submit(pid(1), ClientEvent::Unready).await.unwrap();
        room.submit(pid(1), ClientEvent::Ready).await.unwrap();
    }

    let events = collect_until(&mut ada, is_round_end).await;
    assert_eq!(events.iter().filter(|e| is_round_start(e)).count(), 1);
    assert_eq!(room.info().await.unwrap().timer_arms, 2);
}

#[tokio::test(start_paused = true)]
async fn test_watchers_receive_broadcasts_without_joining() {
    let room = cat_room();
    let (tx, mut watcher) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    room.attach(pid(50), tx).await.unwrap();
    for _ in 0..3 {
        next(&mut watcher).await;
    }

    let _ada = seat(&room, 1, "ada").await;

    let ServerEvent::RosterUpdate { players } = next(&mut watcher).await else {
        panic!("expected a roster update");
    };
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].username, "ada");
}

#[tokio::test(start_paused = true)]
async fn test_handle_errors_after_shutdown() {
    let room = cat_room();
    room.shutdown().await.unwrap();
    let result = room.info().await;
    assert!(matches!(result, Err(RoomError::Unavailable)));
}
