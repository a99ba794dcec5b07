//! Table module running one Hold'em table as an async actor.
//!
//! This module implements:
//! - TableActor: Async actor owning a single table engine
//! - Message-based communication with tokio channels
//! - Table configuration and settled hand history
//!
//! ## Architecture
//!
//! The table runs in its own Tokio task with an mpsc message inbox. Every
//! command is applied to the engine one at a time in arrival order, and each
//! subscriber then receives a snapshot scoped to what they may see.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::net::messages::TableCommand;
//! use holdem_table::table::{TableActor, TableConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = TableActor::new(TableConfig::default());
//!     tokio::spawn(actor.run());
//!
//!     handle.command(1, TableCommand::SitDown).await.unwrap();
//!     handle.command(1, TableCommand::BuyIn(1000)).await.unwrap();
//! }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::{HandHistoryEntry, TableMessage};
