//! Network module.
//!
//! Contains the per-network [`Server`] connection and its keepalive timer.

mod connection;
pub mod keepalive;

pub use connection::{ConnectionStatus, Server};
