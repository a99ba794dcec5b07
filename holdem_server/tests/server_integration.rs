//! Integration tests for the TCP front end.
//!
//! A real listener on an ephemeral port, real sockets and the same framing
//! the client uses.

use holdem_server::server::serve;
use holdem_table::{
    TableActor, TableConfig, TableSnapshot,
    entities::{Action, SeatError, Stage},
    messages::{ClientMessage, ProtocolError, ServerMessage, TableCommand},
    utils::{read_prefixed, write_prefixed},
};
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    sync::oneshot,
    time::timeout,
};

async fn start_server() -> (SocketAddr, oneshot::Sender<()>) {
    let config = TableConfig {
        seed: Some(3),
        auto_start: false,
        tick_ms: 60_000,
        ..TableConfig::default()
    };
    let (actor, table) = TableActor::new(config);
    tokio::spawn(actor.run());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(serve(listener, table, async {
        let _ = stopped.await;
    }));
    (addr, stop)
}

async fn send(stream: &mut TcpStream, command: TableCommand) {
    write_prefixed(stream, &ClientMessage { command }).await.unwrap();
}

/// Read frames until one matches, skipping the rest.
async fn expect<T>(stream: &mut TcpStream, mut matcher: impl FnMut(ServerMessage) -> Option<T>) -> T {
    timeout(Duration::from_secs(2), async {
        loop {
            let message: ServerMessage = read_prefixed(stream).await.unwrap();
            if let Some(found) = matcher(message) {
                return found;
            }
        }
    })
    .await
    .expect("expected frame never arrived")
}

async fn connect(addr: SocketAddr) -> (TcpStream, i32) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let player_id = expect(&mut stream, |message| match message {
        ServerMessage::Welcome { player_id } => Some(player_id),
        _ => None,
    })
    .await;
    (stream, player_id)
}

async fn expect_reply(stream: &mut TcpStream) -> Result<TableCommand, ProtocolError> {
    expect(stream, |message| match message {
        ServerMessage::Ack(command) => Some(Ok(command)),
        ServerMessage::Error(error) => Some(Err(error)),
        _ => None,
    })
    .await
}

fn state(message: ServerMessage) -> Option<TableSnapshot> {
    match message {
        ServerMessage::TableState(bytes) => Some(TableSnapshot::from_bytes(&bytes).unwrap()),
        _ => None,
    }
}

#[tokio::test]
async fn test_connections_get_distinct_ids() {
    let (addr, _stop) = start_server().await;
    let (_a, first) = connect(addr).await;
    let (_b, second) = connect(addr).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_commands_are_acknowledged_or_refused() {
    let (addr, _stop) = start_server().await;
    let (mut stream, _) = connect(addr).await;

    send(&mut stream, TableCommand::SitDown).await;
    assert_eq!(expect_reply(&mut stream).await, Ok(TableCommand::SitDown));

    send(&mut stream, TableCommand::SitDown).await;
    assert_eq!(
        expect_reply(&mut stream).await,
        Err(ProtocolError::Seat(SeatError::AlreadySeated))
    );
}

#[tokio::test]
async fn test_two_players_start_a_hand() {
    let (addr, _stop) = start_server().await;
    let (mut alice, alice_id) = connect(addr).await;
    let (mut bob, bob_id) = connect(addr).await;

    for stream in [&mut alice, &mut bob] {
        send(stream, TableCommand::SitDown).await;
        expect_reply(stream).await.unwrap();
        send(stream, TableCommand::BuyIn(1000)).await;
        expect_reply(stream).await.unwrap();
    }
    send(&mut alice, TableCommand::StartHand).await;
    expect_reply(&mut alice).await.unwrap();

    let view = expect(&mut bob, |message| state(message).filter(|s| s.stage == Stage::PreFlop)).await;
    assert_eq!(view.total_pot, 15);
    assert!(view.seat_of(bob_id).unwrap().hole[0].is_valid());
    assert!(!view.seat_of(alice_id).unwrap().hole[0].is_valid());

    let acting = view.acting_player_id.unwrap();
    let stream = if acting == alice_id { &mut alice } else { &mut bob };
    send(
        stream,
        TableCommand::TakeAction {
            action: Action::Fold,
            amount: 0,
        },
    )
    .await;
    expect(stream, |message| match message {
        ServerMessage::HandResult(_) => Some(()),
        _ => None,
    })
    .await;
}

#[tokio::test]
async fn test_garbage_frame_reported_as_malformed() {
    let (addr, _stop) = start_server().await;
    let (mut stream, _) = connect(addr).await;

    // A frame whose body isn't a ClientMessage.
    stream.write_all(&[2, 0, 0, 0, 0xff, 0xff]).await.unwrap();
    let error = expect_reply(&mut stream).await.unwrap_err();
    assert!(matches!(error, ProtocolError::Malformed(_)));

    // The connection is still usable afterwards.
    send(&mut stream, TableCommand::TableInfo).await;
    assert_eq!(expect_reply(&mut stream).await, Ok(TableCommand::TableInfo));
}

#[tokio::test]
async fn test_disconnect_frees_seat() {
    let (addr, _stop) = start_server().await;
    let (mut watcher, _) = connect(addr).await;
    let (mut leaver, leaver_id) = connect(addr).await;

    send(&mut leaver, TableCommand::SitDown).await;
    expect_reply(&mut leaver).await.unwrap();
    expect(&mut watcher, |message| state(message).filter(|s| s.seat_of(leaver_id).is_some())).await;

    drop(leaver);
    expect(&mut watcher, |message| state(message).filter(|s| s.seat_of(leaver_id).is_none())).await;
}
