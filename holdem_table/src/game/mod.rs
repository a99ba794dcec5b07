//! Hold'em table engine - seats, betting rules, pots and showdown.
//!
//! This module provides the single-table game implementation including:
//! - Cards, deck, seats and side pots
//! - A pluggable hand ranking capability with a standard 7-card ranker
//! - The betting state machine driving a hand from blinds to settlement
//! - Per-viewer snapshots and settled hand results with a fixed wire layout

pub mod constants;
pub mod engine;
pub mod entities;
pub mod evaluator;
pub mod result;
pub mod snapshot;
pub mod wire;

pub use engine::HoldemPokerGame;
pub use evaluator::{HandEvaluator, HandScore, StandardEvaluator};
pub use result::{HandResult, PlayerHandResult};
pub use snapshot::{SeatSnapshot, TableSnapshot};
