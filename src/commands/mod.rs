//! Command engine.
//!
//! Commands live in a tree of namespaces ([`registry`]), declare their
//! arguments with a [`Signature`], and answer through a [`Responder`]. The
//! [`Dispatcher`] turns prefixed PRIVMSGs into invocations, each running in
//! its own task.

pub mod dispatch;
pub mod registry;
pub mod responder;
pub mod signature;

use std::future::Future;

use async_trait::async_trait;

pub use dispatch::Dispatcher;
pub use registry::{CommandEntry, CommandNode, CommandRegistry, Namespace, Resolution};
pub use responder::{Invocation, ReplyKind, Responder};
pub use signature::{ArgValue, Arguments, Flag, FlagKind, Signature};

/// A command implementation.
///
/// Errors (including [`crate::error::BindingError`]s raised by the handler
/// while reading its arguments) are turned into one reply line by the
/// dispatcher.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn call(&self, responder: Responder, args: Arguments) -> anyhow::Result<()>;
}

/// Adapter for plain async functions and closures.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Responder, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn call(&self, responder: Responder, args: Arguments) -> anyhow::Result<()> {
        (self.0)(responder, args).await
    }
}
