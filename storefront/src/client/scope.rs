//! Request lifetimes bound to the view that issued them.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::task::JoinSet;

/// Owns the fetches issued on behalf of one view.
///
/// Dropping the scope aborts every task still running, so a response that
/// arrives after the view is gone is discarded instead of applied.
#[derive(Debug, Default)]
pub struct RequestScope {
    tasks: JoinSet<()>,
}

/// Outcome of a scoped task: `None` when the scope was dropped or cancelled first.
#[derive(Debug)]
pub struct Scoped<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Future for Scoped<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a future inside the scope. Must be called within a Tokio runtime.
    pub fn spawn<F>(&mut self, future: F) -> Scoped<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.tasks.spawn(async move {
            let _ = tx.send(future.await);
        });
        Scoped { rx }
    }

    /// Number of tasks not yet reaped.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Abort every outstanding task.
    pub fn cancel(&mut self) {
        self.tasks.abort_all();
    }
}
