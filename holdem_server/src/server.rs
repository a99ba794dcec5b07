//! TCP front end for one table.
//!
//! Every connection gets a fresh player id, a `Welcome` frame and a
//! subscription to the table. Frames read from the socket are turned into
//! table commands; replies, snapshots and hand results share one writer task
//! per connection.

use std::{
    future::Future,
    io,
    sync::{
        Arc,
        atomic::{AtomicI32, Ordering},
    },
};

use anyhow::Error;
use holdem_table::{
    PlayerId, TableHandle,
    messages::{ClientMessage, ProtocolError, ServerMessage},
    net::errors::SerializationError,
    utils::{read_prefixed, write_prefixed},
};
use log::{debug, error, info, warn};
use tokio::{
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};

/// Outgoing frames buffered per connection before updates are dropped.
const OUTBOX_CAPACITY: usize = 64;

/// Accept connections until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    table: TableHandle,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    let next_player_id = Arc::new(AtomicI32::new(1));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Accept failed: {e}");
                        continue;
                    }
                };
                let player_id = next_player_id.fetch_add(1, Ordering::Relaxed);
                info!("{addr} connected as player {player_id}");
                tokio::spawn(handle_connection(stream, player_id, table.clone()));
            }

            () = &mut shutdown => {
                info!("Stopped accepting connections");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, player_id: PlayerId, table: TableHandle) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Player {player_id}: couldn't set TCP_NODELAY: {e}");
    }
    let (reader, writer) = stream.into_split();
    let (outbox, inbox) = mpsc::channel(OUTBOX_CAPACITY);

    let writer_task = tokio::spawn(write_frames(writer, inbox, player_id));

    if outbox.send(ServerMessage::Welcome { player_id }).await.is_err()
        || table.subscribe(player_id, outbox.clone()).await.is_err()
    {
        warn!("Player {player_id}: table unavailable, closing connection");
    } else {
        read_commands(reader, player_id, &table, &outbox).await;
    }

    if table.disconnect(player_id).await.is_err() {
        debug!("Player {player_id}: table already closed");
    }
    drop(outbox);
    if let Err(e) = writer_task.await {
        error!("Player {player_id}: writer task failed: {e}");
    }
    info!("Player {player_id} disconnected");
}

/// Apply every frame the client sends until it hangs up or breaks framing.
async fn read_commands(
    mut reader: OwnedReadHalf,
    player_id: PlayerId,
    table: &TableHandle,
    outbox: &mpsc::Sender<ServerMessage>,
) {
    loop {
        let reply = match read_prefixed::<ClientMessage, _>(&mut reader).await {
            Ok(ClientMessage { command }) => match table.command(player_id, command.clone()).await {
                Ok(()) => ServerMessage::Ack(command),
                Err(ProtocolError::TableClosed) => break,
                Err(error) => ServerMessage::Error(error),
            },
            Err(SerializationError::Io(e)) => {
                if e.kind() != io::ErrorKind::UnexpectedEof {
                    warn!("Player {player_id}: read failed: {e}");
                }
                break;
            }
            Err(e @ SerializationError::MessageTooLarge { .. }) => {
                // The rest of the stream can't be framed any more.
                warn!("Player {player_id}: {e}");
                let _ = outbox
                    .send(ServerMessage::Error(ProtocolError::Malformed(e.to_string())))
                    .await;
                break;
            }
            Err(e) => {
                warn!("Player {player_id}: {e}");
                ServerMessage::Error(ProtocolError::Malformed(e.to_string()))
            }
        };
        if outbox.send(reply).await.is_err() {
            break;
        }
    }
}

async fn write_frames(
    mut writer: OwnedWriteHalf,
    mut inbox: mpsc::Receiver<ServerMessage>,
    player_id: PlayerId,
) {
    while let Some(message) = inbox.recv().await {
        if let Err(e) = write_prefixed(&mut writer, &message).await {
            debug!("Player {player_id}: write failed: {e}");
            break;
        }
    }
}
