//! # Hold'em Table
//!
//! A networked Texas Hold'em cash table.
//!
//! This library provides the table engine that enforces betting rules and
//! settles pots, the actor that owns a table and serializes every command into
//! it, and the wire protocol spoken between the server and its clients.
//!
//! ## Architecture
//!
//! A hand moves through a fixed sequence of stages:
//!
//! - **Waiting**: between hands; players sit, buy in and leave
//! - **PreFlop**: blinds posted, hole cards dealt, first betting round
//! - **Flop/Turn/River**: community cards and further betting rounds
//! - **Showdown**: pots are split among the best live hands
//!
//! A hand ends early when everyone but one player folds, and runs the board
//! out without further betting once fewer than two players can still bet.
//!
//! ## Core Modules
//!
//! - [`game`]: Table engine, entities, hand ranking and wire layouts
//! - [`net`]: Message protocol and framing
//! - [`table`]: Async actor owning one table
//!
//! ## Example
//!
//! ```
//! use holdem_table::{HoldemPokerGame, entities::Action};
//!
//! let mut game = HoldemPokerGame::with_seed(6, 7);
//! game.set_blinds(5, 10);
//! for player_id in 1..=3 {
//!     game.sit_down(player_id).unwrap();
//!     game.buy_in(player_id, 1000);
//! }
//! assert!(game.start_hand());
//! let acting = game.acting_player_id().unwrap();
//! game.handle_action(acting, Action::CheckCall, 0);
//! ```

/// Table engine, entities and hand ranking.
pub mod game;
pub use game::{
    HandEvaluator, HandResult, HandScore, HoldemPokerGame, StandardEvaluator, TableSnapshot,
    constants::{self, DEFAULT_MAX_SEATS, MAX_SEATS},
    entities::{self, Action, ActionResult, Chips, PlayerId, SeatIndex, Stage},
};

/// Networking components for client-server communication.
pub mod net;
pub use net::{messages, utils};

/// Async table actor.
pub mod table;
pub use table::{TableActor, TableConfig, TableHandle};
