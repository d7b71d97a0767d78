//! Core pull-stream abstraction: providers, lifecycle elements, and the
//! [`Stream`] type that pairs one provider chain with its lifecycle list.
//!
//! A stream is single-owner and single-consumer. Nothing is pulled before
//! every lifecycle element has been opened, and every element is closed
//! exactly once when consumption ends — on success, on error, on early
//! cancellation, and on a panicking visitor alike.

use async_trait::async_trait;
use std::panic::{self, AssertUnwindSafe};

use crate::context::StreamContext;
use crate::error::{combine_open_failures, StreamError, StreamResult};
use crate::optional::Lazy;

/// The atomic unit every combinator is built from: pull one element.
///
/// `emit` returns `Ok(Some(element))` for each element, `Ok(None)` exactly
/// once at the end of the sequence, or an error. Calling `emit` again after
/// `Ok(None)` or an error is undefined; no combinator in this crate does.
///
/// A provider that needs resources overrides `open`/`close`. Wrapping
/// providers (map, filter, limit, ...) forward both to the provider they
/// wrap, so opening the top of a chain opens all the way down.
#[async_trait]
pub trait SequenceProvider<T>: Send {
    async fn open(&mut self, _ctx: &StreamContext) -> StreamResult<()> {
        Ok(())
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>>;

    async fn close(&mut self) {}
}

/// An open/close-paired resource subscribed onto a stream, in addition to
/// whatever the provider chain itself acquires.
///
/// `close` must be safe to call after a failed `open` and must never mask
/// an error already being propagated; it returns nothing and logs its own
/// problems internally.
#[async_trait]
pub trait StreamLifecycle: Send {
    async fn open(&mut self, _ctx: &StreamContext) -> StreamResult<()> {
        Ok(())
    }

    async fn close(&mut self) {}
}

/// A [`StreamLifecycle`] built from a pair of plain closures, either of
/// which may be omitted.
pub struct FnLifecycle<O, C>
where
    O: FnMut(&StreamContext) -> StreamResult<()> + Send,
    C: FnMut() + Send,
{
    open_fn: Option<O>,
    close_fn: Option<C>,
}

impl<O, C> FnLifecycle<O, C>
where
    O: FnMut(&StreamContext) -> StreamResult<()> + Send,
    C: FnMut() + Send,
{
    pub fn new(open_fn: O, close_fn: C) -> Self {
        Self {
            open_fn: Some(open_fn),
            close_fn: Some(close_fn),
        }
    }
}

#[async_trait]
impl<O, C> StreamLifecycle for FnLifecycle<O, C>
where
    O: FnMut(&StreamContext) -> StreamResult<()> + Send,
    C: FnMut() + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        match &mut self.open_fn {
            Some(f) => f(ctx),
            None => Ok(()),
        }
    }

    async fn close(&mut self) {
        if let Some(f) = &mut self.close_fn {
            f();
        }
    }
}

/// A lazily produced sequence with explicit resource lifecycle.
///
/// The lifecycle element list is part of this concrete type, so combinators
/// always have access to it and derived streams carry it over verbatim —
/// no combinator ever needs to recover an internal representation from a
/// trait object.
pub struct Stream<T> {
    provider: Box<dyn SequenceProvider<T>>,
    lifecycle: Vec<Box<dyn StreamLifecycle>>,
}

impl<T: Send + 'static> Stream<T> {
    /// Wrap a provider. The provider's own `open`/`close` hooks are its
    /// lifecycle; additional elements can be attached with
    /// [`Stream::subscribe_lifecycle`].
    pub fn new(provider: impl SequenceProvider<T> + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            lifecycle: Vec::new(),
        }
    }

    pub(crate) fn with_parts(
        provider: Box<dyn SequenceProvider<T>>,
        lifecycle: Vec<Box<dyn StreamLifecycle>>,
    ) -> Self {
        Self {
            provider,
            lifecycle,
        }
    }

    pub(crate) fn into_parts(self) -> (Box<dyn SequenceProvider<T>>, Vec<Box<dyn StreamLifecycle>>) {
        (self.provider, self.lifecycle)
    }

    /// Attach an extra lifecycle element, opened before the first pull and
    /// closed when consumption ends.
    pub fn subscribe_lifecycle(mut self, element: impl StreamLifecycle + 'static) -> Self {
        self.lifecycle.push(Box::new(element));
        self
    }

    /// Open the provider chain and every subscribed element, attempting all
    /// of them and aggregating every failure into one error.
    pub(crate) async fn open_all(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        let mut failures = Vec::new();
        if let Err(e) = self.provider.open(ctx).await {
            failures.push(e);
        }
        for element in &mut self.lifecycle {
            if let Err(e) = element.open(ctx).await {
                failures.push(e);
            }
        }
        combine_open_failures(failures)
    }

    /// Close the provider chain and every subscribed element. Best-effort,
    /// never fails, safe after a failed open.
    pub(crate) async fn close_all(&mut self) {
        self.provider.close().await;
        for element in &mut self.lifecycle {
            element.close().await;
        }
    }

    pub(crate) async fn pull(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        self.provider.emit(ctx).await
    }

    /// Consume the whole stream, invoking `f` per element.
    ///
    /// Cancelling `ctx` stops consumption cleanly (`Ok(())`), it is not an
    /// error. All lifecycle elements are closed before this returns.
    pub async fn consume<F>(self, ctx: &StreamContext, mut f: F) -> StreamResult<()>
    where
        F: FnMut(T) + Send,
    {
        self.try_consume(ctx, |v| {
            f(v);
            Ok(())
        })
        .await
    }

    /// Like [`Stream::consume`] but the visitor may fail; its error aborts
    /// consumption and is propagated after everything has been closed.
    pub async fn try_consume<F>(mut self, ctx: &StreamContext, mut f: F) -> StreamResult<()>
    where
        F: FnMut(T) -> StreamResult<()> + Send,
    {
        let child = ctx.child();
        let opened = self.open_all(&child).await;

        let result = match opened {
            Err(e) => Err(e),
            Ok(()) => loop {
                if child.is_cancelled() {
                    break Ok(());
                }
                match self.provider.emit(&child).await {
                    Ok(Some(v)) => {
                        match panic::catch_unwind(AssertUnwindSafe(|| f(v))) {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => break Err(e),
                            Err(payload) => {
                                child.cancel();
                                self.close_all().await;
                                panic::resume_unwind(payload);
                            }
                        }
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                }
            },
        };

        child.cancel();
        self.close_all().await;
        result
    }

    /// Collect all elements into a `Vec`, in order.
    pub async fn collect(self, ctx: &StreamContext) -> StreamResult<Vec<T>> {
        let mut result = Vec::new();
        self.consume(ctx, |v| result.push(v)).await?;
        Ok(result)
    }

    /// Count the elements without retaining them.
    pub async fn count(self, ctx: &StreamContext) -> StreamResult<u64> {
        let mut n = 0u64;
        self.consume(ctx, |_| n += 1).await?;
        Ok(n)
    }

    /// The first element, as a deferred computation.
    ///
    /// Forcing the [`Lazy`] opens the stream, cancels as soon as one element
    /// has been produced so resources are released immediately, and yields
    /// `None` for an empty stream.
    pub fn find_first(self) -> Lazy<T> {
        Lazy::new(move |ctx: StreamContext| {
            Box::pin(async move {
                let child = ctx.child();
                let cancel = child.clone();
                let mut found: Option<T> = None;
                let res = self
                    .consume(&child, |v| {
                        if found.is_none() {
                            found = Some(v);
                            cancel.cancel();
                        }
                    })
                    .await;
                if found.is_some() {
                    return Ok(found);
                }
                res?;
                Ok(None)
            })
        })
    }

    /// The last element, as a deferred computation. Forcing it drains the
    /// stream to completion.
    pub fn find_last(self) -> Lazy<T> {
        Lazy::new(move |ctx: StreamContext| {
            Box::pin(async move {
                let mut last: Option<T> = None;
                self.consume(&ctx, |v| last = Some(v)).await?;
                Ok(last)
            })
        })
    }

    /// The first element, or [`StreamError::Absent`] for an empty stream.
    pub async fn first(self, ctx: &StreamContext) -> StreamResult<T> {
        self.find_first().get(ctx).await?.ok_or(StreamError::Absent)
    }
}
