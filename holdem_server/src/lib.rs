//! TCP server hosting a single Hold'em table.
//!
//! The binary loads a [`config::ServerConfig`], spawns the table actor and
//! hands the listener to [`server::serve`].

pub mod config;
pub mod server;
