//! Stream constructors and adapters to the ecosystem `Stream` trait.

use async_stream::stream;
use async_trait::async_trait;
use futures_core::Stream as FuturesStream;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::{SequenceProvider, Stream};

struct EmptyProvider;

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for EmptyProvider {
    async fn emit(&mut self, _ctx: &StreamContext) -> StreamResult<Option<T>> {
        Ok(None)
    }
}

struct IterProvider<I> {
    iter: I,
}

#[async_trait]
impl<I> SequenceProvider<I::Item> for IterProvider<I>
where
    I: Iterator + Send,
    I::Item: Send + 'static,
{
    async fn emit(&mut self, _ctx: &StreamContext) -> StreamResult<Option<I::Item>> {
        Ok(self.iter.next())
    }
}

struct FuturesStreamProvider<T> {
    inner: BoxStream<'static, T>,
}

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for FuturesStreamProvider<T> {
    async fn emit(&mut self, _ctx: &StreamContext) -> StreamResult<Option<T>> {
        Ok(self.inner.next().await)
    }
}

impl<T: Send + 'static> Stream<T> {
    /// A stream that completes immediately. No lifecycle, nothing opened.
    pub fn empty() -> Stream<T> {
        Stream::new(EmptyProvider)
    }

    /// A single-element stream.
    pub fn emit(item: T) -> Stream<T> {
        Stream::from_iter(std::iter::once(item))
    }

    /// A stream over an in-memory collection.
    pub fn from_iter<I>(items: I) -> Stream<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Stream::new(IterProvider {
            iter: items.into_iter(),
        })
    }

    /// Adapt a push-style ecosystem stream into the pull interface. The
    /// adapted stream has no lifecycle of its own; resource handling stays
    /// with whoever built the inner stream.
    pub fn from_futures_stream<S>(inner: S) -> Stream<T>
    where
        S: FuturesStream<Item = T> + Send + 'static,
    {
        Stream::new(FuturesStreamProvider {
            inner: inner.boxed(),
        })
    }

    /// Turn this stream into an ecosystem `Stream` of results, driving the
    /// full open/pull/close cycle under a root context. An open failure is
    /// yielded as the single element; the first emit error ends the stream.
    pub fn into_futures_stream(mut self) -> BoxStream<'static, StreamResult<T>> {
        stream! {
            let ctx = StreamContext::new();
            match self.open_all(&ctx).await {
                Err(e) => {
                    self.close_all().await;
                    yield Err(e);
                    return;
                }
                Ok(()) => {}
            }
            loop {
                match self.pull(&ctx).await {
                    Ok(Some(v)) => yield Ok(v),
                    Ok(None) => break,
                    Err(e) => {
                        self.close_all().await;
                        yield Err(e);
                        return;
                    }
                }
            }
            self.close_all().await;
        }
        .boxed()
    }
}
