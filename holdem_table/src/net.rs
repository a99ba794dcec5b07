//! Networking layer for client-server communication.
//!
//! Frames are a `u32` little-endian length followed by a bincode body. Table
//! state travels inside those frames as fixed-layout byte payloads so every
//! viewer decodes exactly what the table wrote.

/// Codec error types.
pub mod errors;

/// Message types for the client-server protocol.
pub mod messages;

/// Fixed little-endian byte layout helpers.
pub mod pack;

/// Length-prefixed framing over async streams.
pub mod utils;
