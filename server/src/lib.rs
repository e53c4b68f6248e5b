//! Volleyball relay server library.
//!
//! Exposes the matchmaking pool, relay loop and WebSocket handler for use in
//! tests and the server binary.

pub mod config;
pub mod matchmaking;
pub mod relay;
pub mod state;
pub mod ws;
