//! Command handlers.
//!
//! Any async function or closure taking a [`CommandContext`] is a handler,
//! as long as it returns something implementing [`IntoOutcome`]:
//!
//! ```rust,ignore
//! // No return value: always succeeds.
//! async fn ping(ctx: CommandContext) {
//!     let _ = ctx.reply("*Pong!*").await;
//! }
//!
//! // Result: an `Err` becomes a fault and is reported.
//! async fn jid(ctx: CommandContext) -> Result<(), ApiError> {
//!     if let Some(chat) = ctx.chat() {
//!         ctx.reply(chat.to_string()).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Handlers are erased into a [`BoxedHandler`], a clonable tower service,
//! when they are registered.

use std::fmt::Display;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tower::service_fn;
use tower::util::BoxCloneSyncService;

use crate::context::CommandContext;
use crate::error::Fault;

// ============================================================================
// IntoOutcome
// ============================================================================

/// Converts a handler return value into its outcome.
pub trait IntoOutcome: Send {
    fn into_outcome(self) -> Result<(), Fault>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), Fault> {
        Ok(())
    }
}

impl<E: Display + Send> IntoOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), Fault> {
        self.map_err(Fault::error)
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// An async command handler.
///
/// Implemented for every `Fn(CommandContext) -> impl Future` whose output
/// implements [`IntoOutcome`].
#[async_trait]
pub trait Handler: Clone + Send + Sync + 'static {
    async fn call(self, ctx: CommandContext) -> Result<(), Fault>;
}

#[async_trait]
impl<F, Fut, R> Handler for F
where
    F: FnOnce(CommandContext) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + 'static,
{
    async fn call(self, ctx: CommandContext) -> Result<(), Fault> {
        (self)(ctx).await.into_outcome()
    }
}

// ============================================================================
// BoxedHandler
// ============================================================================

/// A type-erased handler as stored in a [`Command`](crate::Command).
pub type BoxedHandler = BoxCloneSyncService<CommandContext, (), Fault>;

/// Erases a handler into a [`BoxedHandler`].
pub fn into_handler<H: Handler>(handler: H) -> BoxedHandler {
    BoxCloneSyncService::new(service_fn(
        move |ctx: CommandContext| -> BoxFuture<'static, Result<(), Fault>> {
            handler.clone().call(ctx)
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_outcome() {
        assert_eq!(().into_outcome(), Ok(()));
    }

    #[test]
    fn test_result_outcome() {
        let ok: Result<(), String> = Ok(());
        assert_eq!(ok.into_outcome(), Ok(()));

        let err: Result<(), &str> = Err("boom");
        assert_eq!(err.into_outcome(), Err(Fault::Error("boom".into())));
    }
}
