//! Table actor message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{
    game::{entities::PlayerId, result::HandResult},
    net::messages::{ProtocolError, ServerMessage, TableCommand},
};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Start receiving per-viewer snapshots and hand results
    Subscribe {
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
    },

    /// Stop receiving updates
    Unsubscribe { player_id: PlayerId },

    /// A player command, answered once it has been applied or refused
    Command {
        player_id: PlayerId,
        command: TableCommand,
        respond_to: oneshot::Sender<Result<(), ProtocolError>>,
    },

    /// Connection dropped: stop updates and leave after the current hand
    Disconnect { player_id: PlayerId },

    /// Settled hands, oldest first
    History {
        respond_to: oneshot::Sender<Vec<HandHistoryEntry>>,
    },

    /// Internal: drive auto-play and auto-start (normally from the timer)
    Tick,

    /// Stop the actor
    Close,
}

/// One settled hand kept in the table's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandHistoryEntry {
    /// Hands settled at this table so far, this one included
    pub hand_number: u64,

    /// When the hand settled
    pub finished_at: DateTime<Utc>,

    pub result: HandResult,
}
