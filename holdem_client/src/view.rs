//! Turns server frames into text for the terminal.
//!
//! Table snapshots are loaded into a local read-only mirror of the table so
//! the client can answer "is it my turn and what do I owe" the same way the
//! server does.

use holdem_table::{
    HoldemPokerGame, PlayerId, StandardEvaluator, TableSnapshot,
    game::{HandResult, wire::NO_PLAYER},
    messages::ServerMessage,
    net::errors::SerializationError,
};

pub struct TableView {
    player_id: Option<PlayerId>,
    mirror: HoldemPokerGame,
}

impl TableView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            player_id: None,
            mirror: HoldemPokerGame::with_seed(holdem_table::MAX_SEATS, 0),
        }
    }

    /// Player id assigned by the server, once welcomed.
    #[must_use]
    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    /// The last table state received.
    #[must_use]
    pub fn table(&self) -> &HoldemPokerGame {
        &self.mirror
    }

    /// Apply one frame and return what to print.
    ///
    /// # Errors
    ///
    /// Returns error if a table payload is corrupt.
    pub fn handle(&mut self, message: ServerMessage) -> Result<String, SerializationError> {
        let text = match message {
            ServerMessage::Welcome { player_id } => {
                self.player_id = Some(player_id);
                format!("Connected as player {player_id}. Type 'help' for commands.")
            }
            ServerMessage::Ack(command) => format!("ok: {command}"),
            ServerMessage::Error(error) => format!("error: {error}"),
            ServerMessage::TableState(bytes) => {
                self.mirror.load_snapshot(TableSnapshot::from_bytes(&bytes)?);
                self.render_table()
            }
            ServerMessage::HandResult(bytes) => {
                let result = HandResult::from_bytes(&bytes)?;
                result.display(&StandardEvaluator).to_string()
            }
        };
        Ok(text)
    }

    fn render_table(&self) -> String {
        let viewer = self.player_id.unwrap_or(NO_PLAYER);
        let mut text = self.mirror.snapshot(viewer).to_string();

        let Some(player_id) = self.player_id else {
            return text;
        };
        if self.mirror.acting_player_id() != Some(player_id) {
            return text;
        }
        if let Some(seat) = self.mirror.seat_of(player_id) {
            let to_call = (self.mirror.last_bet() - seat.current_bet).max(0);
            if to_call > 0 {
                text.push_str(&format!("Your turn: {to_call} to call, {} behind", seat.chips));
            } else {
                text.push_str(&format!("Your turn: check or bet, {} behind", seat.chips));
            }
        }
        text
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}
