use serde::{Deserialize, Serialize};
use std::fmt;

use crate::game::{
    constants::MAX_TABLE_CHIPS,
    entities::{Action, BuyInResult, Chips, PlayerId, SeatError, SetBlindsResult},
};

/// Reasons a table command was refused, as reported to the client that sent
/// it.
#[derive(Clone, Debug, Deserialize, Eq, thiserror::Error, PartialEq, Serialize)]
pub enum ProtocolError {
    #[error(transparent)]
    Seat(#[from] SeatError),
    #[error("buy-in must be at least {min_buy_in}")]
    BelowMinimum { min_buy_in: Chips },
    #[error("table can't hold more than {max} chips")]
    ChipLimit { max: Chips },
    #[error("a hand is in progress")]
    GameInProgress,
    #[error("blinds can't change while players are seated")]
    PlayersSeated,
    #[error("blinds must be positive")]
    InvalidBlinds,
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("action not allowed")]
    InvalidAction,
    #[error("not enough players to start")]
    CannotStart,
    #[error("table is closed")]
    TableClosed,
    #[error("malformed message: {0}")]
    Malformed(String),
}

impl ProtocolError {
    /// Map a buy-in outcome. `None` on success.
    #[must_use]
    pub fn from_buy_in(result: BuyInResult, min_buy_in: Chips) -> Option<Self> {
        match result {
            BuyInResult::Success => None,
            BuyInResult::BelowMinimum => Some(Self::BelowMinimum { min_buy_in }),
            BuyInResult::PlayerNotFound => Some(Self::Seat(SeatError::PlayerNotFound)),
            BuyInResult::AlreadyInHand => Some(Self::Seat(SeatError::InHand)),
            BuyInResult::ExceedsTableLimit => Some(Self::ChipLimit {
                max: MAX_TABLE_CHIPS,
            }),
        }
    }

    /// Map a blind change outcome. `None` on success.
    #[must_use]
    pub fn from_set_blinds(result: SetBlindsResult) -> Option<Self> {
        match result {
            SetBlindsResult::Success => None,
            SetBlindsResult::GameInProgress => Some(Self::GameInProgress),
            SetBlindsResult::PlayersSeated => Some(Self::PlayersSeated),
            SetBlindsResult::InvalidValue => Some(Self::InvalidBlinds),
        }
    }
}

/// A request from a seated or would-be player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TableCommand {
    /// Take the lowest free seat.
    SitDown,
    /// Add chips to the stack between hands.
    BuyIn(Chips),
    /// Sit out from the next hand.
    StandUp,
    /// Return from sitting out.
    SitBack,
    /// Leave the table once the current hand is over.
    Leave,
    /// Take the stack off the table.
    CashOut,
    SetBlinds { small_blind: Chips, big_blind: Chips },
    /// Betting action. See [`Action`] for what `amount` means.
    TakeAction { action: Action, amount: Chips },
    StartHand,
    /// Ask for a fresh snapshot.
    TableInfo,
}

impl fmt::Display for TableCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SitDown => write!(f, "sat down"),
            Self::BuyIn(amount) => write!(f, "bought in for {amount}"),
            Self::StandUp => write!(f, "stood up"),
            Self::SitBack => write!(f, "sat back"),
            Self::Leave => write!(f, "left"),
            Self::CashOut => write!(f, "cashed out"),
            Self::SetBlinds {
                small_blind,
                big_blind,
            } => write!(f, "set blinds to {small_blind}/{big_blind}"),
            Self::TakeAction {
                action: action @ (Action::Bet | Action::Raise),
                amount,
            } => write!(f, "{action} {amount}"),
            Self::TakeAction { action, .. } => write!(f, "{action}"),
            Self::StartHand => write!(f, "started the hand"),
            Self::TableInfo => write!(f, "requested table info"),
        }
    }
}

/// A message from a client to the server. The sender is identified by its
/// connection, never by the message itself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClientMessage {
    pub command: TableCommand,
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

/// A message from the server to a client.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ServerMessage {
    /// First message on every connection.
    Welcome { player_id: PlayerId },
    /// The client's command was applied.
    Ack(TableCommand),
    /// The client's command was refused. Nothing changed.
    Error(ProtocolError),
    /// A `TableSnapshot` in its fixed wire layout, scoped to the receiver.
    TableState(Vec<u8>),
    /// A `HandResult` in its fixed wire layout.
    HandResult(Vec<u8>),
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Welcome { player_id } => write!(f, "welcome, player {player_id}"),
            Self::Ack(command) => write!(f, "ok: {command}"),
            Self::Error(error) => write!(f, "error: {error}"),
            Self::TableState(bytes) => write!(f, "table state ({} bytes)", bytes.len()),
            Self::HandResult(bytes) => write!(f, "hand result ({} bytes)", bytes.len()),
        }
    }
}
