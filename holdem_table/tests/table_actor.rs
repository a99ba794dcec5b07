//! Integration tests for the table actor.
//!
//! Commands go through a [`TableHandle`] exactly as the server sends them and
//! subscribers receive the per-viewer snapshots and hand results.

use holdem_table::{
    TableActor, TableConfig, TableHandle, TableSnapshot,
    entities::{Action, Card, SeatError, Stage},
    game::HandResult,
    messages::{ProtocolError, ServerMessage, TableCommand},
    table::TableMessage,
};
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};

fn quiet_config() -> TableConfig {
    TableConfig {
        name: "Test Table".to_string(),
        seed: Some(7),
        auto_start: false,
        tick_ms: 60_000,
        ..TableConfig::default()
    }
}

fn spawn_table() -> TableHandle {
    let (actor, handle) = TableActor::new(quiet_config());
    tokio::spawn(actor.run());
    handle
}

async fn subscribe(handle: &TableHandle, player_id: i32) -> mpsc::Receiver<ServerMessage> {
    let (tx, rx) = mpsc::channel(64);
    handle.subscribe(player_id, tx).await.unwrap();
    rx
}

/// Everything the actor has pushed so far. The history request is answered
/// only after every earlier message has been handled.
async fn settle(handle: &TableHandle, rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    timeout(Duration::from_secs(2), handle.history())
        .await
        .expect("table stopped answering")
        .unwrap();
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

async fn latest_state(handle: &TableHandle, rx: &mut mpsc::Receiver<ServerMessage>) -> TableSnapshot {
    settle(handle, rx)
        .await
        .into_iter()
        .rev()
        .find_map(|message| match message {
            ServerMessage::TableState(bytes) => Some(TableSnapshot::from_bytes(&bytes).unwrap()),
            _ => None,
        })
        .expect("no table state received")
}

async fn seat_and_buy_in(handle: &TableHandle, player_id: i32) {
    handle.command(player_id, TableCommand::SitDown).await.unwrap();
    handle.command(player_id, TableCommand::BuyIn(1000)).await.unwrap();
}

#[tokio::test]
async fn test_subscriber_receives_initial_state() {
    let handle = spawn_table();
    let mut rx = subscribe(&handle, 1).await;

    let state = latest_state(&handle, &mut rx).await;
    assert_eq!(state.stage, Stage::Waiting);
    assert_eq!(state.small_blind, 5);
    assert_eq!(state.big_blind, 10);
    assert!(state.seats.is_empty());
}

#[tokio::test]
async fn test_hand_plays_through_actor() {
    let handle = spawn_table();
    let mut rx1 = subscribe(&handle, 1).await;
    let mut rx2 = subscribe(&handle, 2).await;
    seat_and_buy_in(&handle, 1).await;
    seat_and_buy_in(&handle, 2).await;

    handle.command(1, TableCommand::StartHand).await.unwrap();

    let view1 = latest_state(&handle, &mut rx1).await;
    assert_eq!(view1.stage, Stage::PreFlop);
    assert_eq!(view1.total_pot, 15);
    assert!(view1.seat_of(1).unwrap().hole.iter().all(Card::is_valid));
    assert_eq!(view1.seat_of(2).unwrap().hole, [Card::BLANK; 2]);

    let view2 = latest_state(&handle, &mut rx2).await;
    assert!(view2.seat_of(2).unwrap().hole.iter().all(Card::is_valid));
    assert_eq!(view2.seat_of(1).unwrap().hole, [Card::BLANK; 2]);

    // Heads-up the button posts the big blind and the other seat acts first.
    let acting = view1.acting_player_id.unwrap();
    assert_eq!(acting, 2);
    let fold = TableCommand::TakeAction {
        action: Action::Fold,
        amount: 0,
    };
    assert_eq!(
        handle.command(1, fold.clone()).await,
        Err(ProtocolError::InvalidAction)
    );
    handle.command(acting, fold).await.unwrap();

    let messages = settle(&handle, &mut rx1).await;
    let result = messages
        .iter()
        .find_map(|message| match message {
            ServerMessage::HandResult(bytes) => Some(HandResult::from_bytes(bytes).unwrap()),
            _ => None,
        })
        .expect("no hand result broadcast");
    assert_eq!(result.total_pot, 15);
    assert_eq!(result.winners().map(|pr| pr.player_id).collect::<Vec<_>>(), vec![1]);

    let history = handle.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].hand_number, 1);
    assert_eq!(history[0].result, result);
}

#[tokio::test]
async fn test_buy_in_past_chip_limit_is_refused() {
    let handle = spawn_table();
    seat_and_buy_in(&handle, 1).await;
    handle.command(2, TableCommand::SitDown).await.unwrap();

    assert_eq!(
        handle.command(2, TableCommand::BuyIn(i32::MAX)).await,
        Err(ProtocolError::ChipLimit { max: i32::MAX })
    );
    handle.command(2, TableCommand::BuyIn(i32::MAX - 1000)).await.unwrap();
    assert_eq!(
        handle.command(1, TableCommand::BuyIn(1000)).await,
        Err(ProtocolError::ChipLimit { max: i32::MAX })
    );
}

#[tokio::test]
async fn test_refusals_map_to_protocol_errors() {
    let handle = spawn_table();
    let check = TableCommand::TakeAction {
        action: Action::CheckCall,
        amount: 0,
    };

    assert_eq!(
        handle.command(1, check.clone()).await,
        Err(ProtocolError::NoHandInProgress)
    );
    assert_eq!(
        handle.command(1, TableCommand::BuyIn(1000)).await,
        Err(ProtocolError::Seat(SeatError::PlayerNotFound))
    );

    handle.command(1, TableCommand::SitDown).await.unwrap();
    assert_eq!(
        handle.command(1, TableCommand::SitDown).await,
        Err(ProtocolError::Seat(SeatError::AlreadySeated))
    );
    assert_eq!(
        handle.command(1, TableCommand::BuyIn(500)).await,
        Err(ProtocolError::BelowMinimum { min_buy_in: 1000 })
    );
    assert_eq!(
        handle.command(1, TableCommand::StartHand).await,
        Err(ProtocolError::CannotStart)
    );

    seat_and_buy_in(&handle, 2).await;
    handle.command(1, TableCommand::BuyIn(1000)).await.unwrap();
    handle.command(1, TableCommand::StartHand).await.unwrap();
    assert_eq!(
        handle.command(1, TableCommand::StartHand).await,
        Err(ProtocolError::GameInProgress)
    );
    assert_eq!(
        handle
            .command(
                1,
                TableCommand::SetBlinds {
                    small_blind: 10,
                    big_blind: 20
                }
            )
            .await,
        Err(ProtocolError::GameInProgress)
    );
    assert_eq!(
        handle.command(1, TableCommand::CashOut).await,
        Err(ProtocolError::Seat(SeatError::InHand))
    );
}

#[tokio::test]
async fn test_disconnect_between_hands_frees_seat() {
    let handle = spawn_table();
    let mut rx1 = subscribe(&handle, 1).await;
    seat_and_buy_in(&handle, 1).await;
    handle.command(3, TableCommand::SitDown).await.unwrap();
    assert!(latest_state(&handle, &mut rx1).await.seat_of(3).is_some());

    handle.disconnect(3).await.unwrap();

    let state = latest_state(&handle, &mut rx1).await;
    assert!(state.seat_of(3).is_none());
    assert!(state.seat_of(1).is_some());
}

#[tokio::test]
async fn test_tick_auto_folds_disconnected_player() {
    let handle = spawn_table();
    let mut rx3 = subscribe(&handle, 3).await;
    for player_id in [1, 2, 3] {
        seat_and_buy_in(&handle, player_id).await;
    }
    handle.command(3, TableCommand::StartHand).await.unwrap();

    let state = latest_state(&handle, &mut rx3).await;
    let acting = state.acting_player_id.unwrap();
    assert_eq!(acting, 1);
    handle.disconnect(acting).await.unwrap();
    handle.send(TableMessage::Tick).await.unwrap();

    let state = latest_state(&handle, &mut rx3).await;
    assert_eq!(state.stage, Stage::PreFlop);
    assert!(state.seat_of(1).unwrap().folded);
    assert_ne!(state.acting_player_id, Some(1));

    // The leaver's seat is released once the hand is over.
    let acting = state.acting_player_id.unwrap();
    assert_eq!(acting, 2);
    handle
        .command(
            acting,
            TableCommand::TakeAction {
                action: Action::Fold,
                amount: 0,
            },
        )
        .await
        .unwrap();
    assert!(latest_state(&handle, &mut rx3).await.seat_of(1).is_some());

    handle.send(TableMessage::Tick).await.unwrap();
    let state = latest_state(&handle, &mut rx3).await;
    assert_eq!(state.stage, Stage::Waiting);
    assert!(state.seat_of(1).is_none());
    assert_eq!(handle.history().await.unwrap().len(), 1);
}
