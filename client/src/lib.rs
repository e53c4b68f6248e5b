//! Volleyball match client.
//!
//! Motion, kick and goal controllers run against the [`physics::PhysicsWorld`]
//! and [`physics::Presenter`] traits. The rapier-backed world and the bot let
//! a match run without a browser.

pub mod ball;
pub mod bot;
pub mod config;
pub mod connection;
pub mod goal;
pub mod input;
pub mod kick;
pub mod motion;
pub mod physics;
pub mod rapier_world;
#[cfg(test)]
mod recording;
pub mod scene;
pub mod session;
pub mod timers;
