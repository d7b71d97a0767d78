//! Cancellation-aware execution context threaded through every stream.
//!
//! Every `open` and `emit` call receives a [`StreamContext`]. Cancelling it
//! is a *normal* way to stop consuming — `find_first` cancels deliberately
//! after one element — so cancellation never surfaces as an error.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct StreamContext {
    token: CancellationToken,
}

impl StreamContext {
    /// A fresh root context.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Derive a child context. Cancelling the parent cancels the child,
    /// cancelling the child leaves the parent untouched.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once this context (or an ancestor) is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Default for StreamContext {
    fn default() -> Self {
        Self::new()
    }
}
