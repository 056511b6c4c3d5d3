//! Core handler infrastructure: the per-message context, the effects it
//! collects and the registry that routes messages to handlers.

pub mod context;
pub mod registry;

pub use context::{Context, Effect};
pub use registry::{Handler, Registry};
