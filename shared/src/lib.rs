//! Types shared between the volleyball relay server and its clients.

pub mod config;
pub mod protocol;
pub mod slot;
