//! slircbot - Straylight IRC Bot
//!
//! An extensible multi-server IRC bot. Each configured network gets a
//! [`network::Server`] that keeps a live model of channels and users;
//! prefixed messages are dispatched through a namespaced command tree
//! filled by [`module::Module`]s.

pub mod access;
pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod module;
pub mod modules;
pub mod network;
pub mod state;
pub mod storage;

pub use bot::Bot;
pub use config::Config;
