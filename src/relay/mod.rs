//! Relay server client: destination lists, routes and per-user map storage.

pub mod client;
pub mod messages;

pub use client::HttpRelay;
