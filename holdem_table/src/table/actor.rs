//! Table actor implementation with async message handling.

use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use tokio::{
    sync::{mpsc, oneshot},
    time::interval,
};

use super::{
    config::TableConfig,
    messages::{HandHistoryEntry, TableMessage},
};
use crate::{
    game::{
        HoldemPokerGame,
        entities::{ActionResult, PlayerId, SeatError, Stage},
    },
    net::messages::{ProtocolError, ServerMessage, TableCommand},
};

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    /// Run a command for `player_id` and wait for its outcome.
    pub async fn command(
        &self,
        player_id: PlayerId,
        command: TableCommand,
    ) -> Result<(), ProtocolError> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::Command {
            player_id,
            command,
            respond_to,
        })
        .await
        .map_err(|_| ProtocolError::TableClosed)?;
        response.await.map_err(|_| ProtocolError::TableClosed)?
    }

    pub async fn subscribe(
        &self,
        player_id: PlayerId,
        sender: mpsc::Sender<ServerMessage>,
    ) -> Result<(), String> {
        self.send(TableMessage::Subscribe { player_id, sender }).await
    }

    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), String> {
        self.send(TableMessage::Disconnect { player_id }).await
    }

    pub async fn history(&self) -> Result<Vec<HandHistoryEntry>, String> {
        let (respond_to, response) = oneshot::channel();
        self.send(TableMessage::History { respond_to }).await?;
        response.await.map_err(|_| "Table is closed".to_string())
    }
}

/// Table actor owning a single table
pub struct TableActor {
    /// Table configuration
    config: TableConfig,

    /// The table itself; only this actor touches it
    game: HoldemPokerGame,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Connected viewers, each getting snapshots scoped to themselves
    subscribers: HashMap<PlayerId, mpsc::Sender<ServerMessage>>,

    /// Most recent settled hands, oldest first
    history: VecDeque<HandHistoryEntry>,

    /// Hands settled so far
    hand_count: u64,

    /// Is table closed
    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);

        let mut game = match config.seed {
            Some(seed) => HoldemPokerGame::with_seed(config.max_seats, seed),
            None => HoldemPokerGame::with_entropy(config.max_seats),
        };
        game.set_lock_blinds_when_seated(config.lock_blinds_when_seated);
        if config.small_blind > 0 && config.big_blind > 0 {
            game.set_blinds(config.small_blind, config.big_blind);
        }

        let actor = Self {
            history: VecDeque::with_capacity(config.history_len),
            config,
            game,
            inbox,
            subscribers: HashMap::new(),
            hand_count: 0,
            is_closed: false,
        };

        (actor, TableHandle::new(sender))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Table '{}' starting with {} seats, blinds {}/{}",
            self.config.name,
            self.game.max_seats(),
            self.game.small_blind(),
            self.game.big_blind()
        );

        let mut tick_interval = interval(self.config.tick_interval());

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        // Every handle is gone.
                        break;
                    };
                    self.handle_message(message);
                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick();
                }
            }
        }

        log::info!(
            "Table '{}' closed after {} hands",
            self.config.name,
            self.hand_count
        );
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Subscribe { player_id, sender } => {
                self.subscribers.insert(player_id, sender);
                log::debug!("Player {player_id} subscribed to '{}'", self.config.name);
                self.send_state_to(player_id);
            }

            TableMessage::Unsubscribe { player_id } => {
                self.subscribers.remove(&player_id);
                log::debug!("Player {player_id} unsubscribed from '{}'", self.config.name);
            }

            TableMessage::Command {
                player_id,
                command,
                respond_to,
            } => {
                let stage_before = self.game.stage();
                let is_info = command == TableCommand::TableInfo;
                let result = self.handle_command(player_id, &command);
                match &result {
                    Ok(()) => log::debug!("Player {player_id} {command}"),
                    Err(error) => log::warn!("Player {player_id} {command} refused: {error}"),
                }
                let _ = respond_to.send(result.clone());

                self.publish_hand_result();
                if is_info {
                    self.send_state_to(player_id);
                } else if result.is_ok() || self.game.stage() != stage_before {
                    self.broadcast_state();
                }
            }

            TableMessage::Disconnect { player_id } => {
                self.subscribers.remove(&player_id);
                if self.game.mark_pending_leave(player_id).is_ok() {
                    log::info!("Player {player_id} disconnected from '{}'", self.config.name);
                    if self.game.stage() == Stage::Waiting {
                        self.game.remove_pending_leavers();
                    }
                    self.broadcast_state();
                }
            }

            TableMessage::History { respond_to } => {
                let _ = respond_to.send(self.history.iter().cloned().collect());
            }

            TableMessage::Tick => self.tick(),

            TableMessage::Close => {
                self.is_closed = true;
            }
        }
    }

    fn handle_command(
        &mut self,
        player_id: PlayerId,
        command: &TableCommand,
    ) -> Result<(), ProtocolError> {
        match *command {
            TableCommand::SitDown => {
                let seat_index = self.game.sit_down(player_id)?;
                log::info!(
                    "Player {player_id} took seat {seat_index} at '{}'",
                    self.config.name
                );
                Ok(())
            }

            TableCommand::BuyIn(amount) => {
                let result = self.game.buy_in(player_id, amount);
                match ProtocolError::from_buy_in(result, self.game.min_buy_in()) {
                    Some(error) => Err(error),
                    None => Ok(()),
                }
            }

            TableCommand::StandUp => Ok(self.game.stand_up(player_id)?),

            TableCommand::SitBack => Ok(self.game.sit_back(player_id)?),

            TableCommand::Leave => {
                self.game.mark_pending_leave(player_id)?;
                if self.game.stage() == Stage::Waiting {
                    self.game.remove_pending_leavers();
                }
                Ok(())
            }

            TableCommand::CashOut => {
                let seat = self
                    .game
                    .seat_of(player_id)
                    .ok_or(SeatError::PlayerNotFound)?;
                if seat.in_hand {
                    return Err(SeatError::InHand.into());
                }
                let amount = self.game.cash_out(player_id);
                log::info!("Player {player_id} cashed out {amount} at '{}'", self.config.name);
                Ok(())
            }

            TableCommand::SetBlinds {
                small_blind,
                big_blind,
            } => match ProtocolError::from_set_blinds(self.game.set_blinds(small_blind, big_blind))
            {
                Some(error) => Err(error),
                None => Ok(()),
            },

            TableCommand::TakeAction { action, amount } => {
                match self.game.handle_action(player_id, action, amount) {
                    ActionResult::Success => Ok(()),
                    ActionResult::Invalid => Err(ProtocolError::InvalidAction),
                    ActionResult::Ignored => Err(ProtocolError::NoHandInProgress),
                }
            }

            TableCommand::StartHand => {
                if self.game.stage() != Stage::Waiting {
                    return Err(ProtocolError::GameInProgress);
                }
                if self.game.start_hand() {
                    Ok(())
                } else {
                    Err(ProtocolError::CannotStart)
                }
            }

            TableCommand::TableInfo => Ok(()),
        }
    }

    /// Advance the table without player input: play for auto-mode seats,
    /// drop leavers between hands and start the next hand when configured.
    fn tick(&mut self) {
        if self.is_closed {
            return;
        }
        let mut changed = false;

        while self.game.process_auto_mode_player() {
            changed = true;
        }

        if self.game.stage() == Stage::Waiting {
            if !self.game.remove_pending_leavers().is_empty() {
                changed = true;
            }
            if self.config.auto_start && self.game.can_start() && self.game.start_hand() {
                changed = true;
            }
        }

        self.publish_hand_result();
        if changed {
            self.broadcast_state();
        }
    }

    /// Broadcast the latest hand result once and record it.
    fn publish_hand_result(&mut self) {
        let Some(result) = self.game.take_hand_result() else {
            return;
        };
        self.hand_count += 1;
        log::info!(
            "Table '{}' hand {} settled, pot {}",
            self.config.name,
            self.hand_count,
            result.total_pot
        );

        match result.to_bytes() {
            Ok(bytes) => self.broadcast(|_| Some(ServerMessage::HandResult(bytes.clone()))),
            Err(e) => log::error!("Table '{}': failed to encode hand result: {e}", self.config.name),
        }

        if self.history.len() >= self.config.history_len {
            self.history.pop_front();
        }
        self.history.push_back(HandHistoryEntry {
            hand_number: self.hand_count,
            finished_at: Utc::now(),
            result,
        });
    }

    fn state_for(&self, player_id: PlayerId) -> Option<ServerMessage> {
        match self.game.snapshot(player_id).to_bytes() {
            Ok(bytes) => Some(ServerMessage::TableState(bytes)),
            Err(e) => {
                log::error!("Table '{}': failed to encode snapshot: {e}", self.config.name);
                None
            }
        }
    }

    fn send_state_to(&mut self, player_id: PlayerId) {
        let Some(message) = self.state_for(player_id) else {
            return;
        };
        if let Some(sender) = self.subscribers.get(&player_id) {
            if sender.try_send(message).is_err() {
                log::warn!("Subscriber {player_id} unreachable, dropping snapshot");
            }
        }
    }

    /// Broadcast each subscriber its own view of the table.
    fn broadcast_state(&mut self) {
        let messages: HashMap<PlayerId, ServerMessage> = self
            .subscribers
            .keys()
            .filter_map(|player_id| Some((*player_id, self.state_for(*player_id)?)))
            .collect();
        self.broadcast(|player_id| messages.get(&player_id).cloned());
    }

    fn broadcast(&mut self, message_for: impl Fn(PlayerId) -> Option<ServerMessage>) {
        self.subscribers.retain(|player_id, sender| {
            let Some(message) = message_for(*player_id) else {
                return true;
            };
            match sender.try_send(message) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {player_id} channel full, dropping update");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {player_id} disconnected, removing");
                    false
                }
            }
        });
    }
}
