//! Single-source combinators: map, filter, limit, skip, flat_map.
//!
//! Each derived stream reuses the parent's lifecycle list verbatim and
//! wraps the parent's provider; the wrapper forwards `open`/`close` down
//! the chain so resources are acquired once and released once.

use async_trait::async_trait;

use crate::context::StreamContext;
use crate::error::{StreamError, StreamResult};
use crate::stream::concat::concat;
use crate::stream::core::{SequenceProvider, Stream};

struct MapProvider<T, F> {
    inner: Box<dyn SequenceProvider<T>>,
    f: F,
}

#[async_trait]
impl<T, U, F> SequenceProvider<U> for MapProvider<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> U + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.inner.open(ctx).await
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<U>> {
        Ok(self.inner.emit(ctx).await?.map(&mut self.f))
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }
}

struct TryMapProvider<T, F> {
    inner: Box<dyn SequenceProvider<T>>,
    f: F,
}

#[async_trait]
impl<T, U, F> SequenceProvider<U> for TryMapProvider<T, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> StreamResult<U> + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.inner.open(ctx).await
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<U>> {
        match self.inner.emit(ctx).await? {
            Some(v) => Ok(Some((self.f)(v)?)),
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }
}

struct FilterProvider<T, F> {
    inner: Box<dyn SequenceProvider<T>>,
    predicate: F,
}

#[async_trait]
impl<T, F> SequenceProvider<T> for FilterProvider<T, F>
where
    T: Send + 'static,
    F: FnMut(&T) -> StreamResult<bool> + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.inner.open(ctx).await
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        loop {
            match self.inner.emit(ctx).await? {
                None => return Ok(None),
                Some(v) => {
                    // Predicate failures get their own wrapper so they can
                    // never be confused with normal completion.
                    let keep = (self.predicate)(&v)
                        .map_err(|e| StreamError::Predicate(e.to_string()))?;
                    if keep {
                        return Ok(Some(v));
                    }
                }
            }
        }
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }
}

struct LimitProvider<T> {
    inner: Box<dyn SequenceProvider<T>>,
    remaining: u64,
}

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for LimitProvider<T> {
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.inner.open(ctx).await
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match self.inner.emit(ctx).await? {
            Some(v) => {
                self.remaining -= 1;
                Ok(Some(v))
            }
            None => {
                self.remaining = 0;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }
}

struct SkipProvider<T> {
    inner: Box<dyn SequenceProvider<T>>,
    to_skip: usize,
    skipped: bool,
}

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for SkipProvider<T> {
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.inner.open(ctx).await
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        if !self.skipped {
            self.skipped = true;
            for _ in 0..self.to_skip {
                if self.inner.emit(ctx).await?.is_none() {
                    return Ok(None);
                }
            }
        }
        self.inner.emit(ctx).await
    }

    async fn close(&mut self) {
        self.inner.close().await;
    }
}

/// Maps every source element to an inner stream and concatenates the
/// results. Not lazy across elements: the source is fully collected, and
/// every inner stream constructed, when the derived stream opens. This
/// keeps at most one inner stream open at a time; the price is that the
/// source is drained up front.
struct FlatMapProvider<T, U, F> {
    src: Option<Stream<T>>,
    f: F,
    inner: Option<Stream<U>>,
}

#[async_trait]
impl<T, U, F> SequenceProvider<U> for FlatMapProvider<T, U, F>
where
    T: Send + 'static,
    U: Send + 'static,
    F: FnMut(T) -> Stream<U> + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        let src = match self.src.take() {
            Some(s) => s,
            None => return Err(StreamError::Custom("flat_map stream already opened".to_string())),
        };
        let items = src.collect(ctx).await?;
        let streams: Vec<Stream<U>> = items.into_iter().map(&mut self.f).collect();
        let mut inner = concat(streams);
        let opened = inner.open_all(ctx).await;
        // Stored even on failure so close reaches whatever did open.
        self.inner = Some(inner);
        opened
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<U>> {
        match &mut self.inner {
            Some(inner) => inner.pull(ctx).await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            inner.close_all().await;
        }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Transform every element.
    pub fn map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        let (inner, lifecycle) = self.into_parts();
        Stream::with_parts(Box::new(MapProvider { inner, f }), lifecycle)
    }

    /// Transform every element with a fallible mapper. Mapper errors are
    /// propagated unchanged.
    pub fn try_map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> StreamResult<U> + Send + 'static,
    {
        let (inner, lifecycle) = self.into_parts();
        Stream::with_parts(Box::new(TryMapProvider { inner, f }), lifecycle)
    }

    /// Keep only elements matching the predicate.
    pub fn filter<F>(self, mut predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.try_filter(move |v| Ok(predicate(v)))
    }

    /// Keep only elements matching a fallible predicate. A predicate error
    /// is wrapped as [`StreamError::Predicate`] and aborts the stream.
    pub fn try_filter<F>(self, predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> StreamResult<bool> + Send + 'static,
    {
        let (inner, lifecycle) = self.into_parts();
        Stream::with_parts(Box::new(FilterProvider { inner, predicate }), lifecycle)
    }

    /// Stop after `limit` elements. A non-positive limit yields an
    /// immediately-empty stream whose lifecycle is never opened, since
    /// nothing will ever be consumed from it.
    pub fn limit(self, limit: i64) -> Stream<T> {
        if limit <= 0 {
            return Stream::empty();
        }
        let (inner, lifecycle) = self.into_parts();
        Stream::with_parts(
            Box::new(LimitProvider {
                inner,
                remaining: limit as u64,
            }),
            lifecycle,
        )
    }

    /// Discard the first `n` elements. The discarding happens lazily on the
    /// first pull, not at construction.
    pub fn skip(self, n: usize) -> Stream<T> {
        let (inner, lifecycle) = self.into_parts();
        Stream::with_parts(
            Box::new(SkipProvider {
                inner,
                to_skip: n,
                skipped: false,
            }),
            lifecycle,
        )
    }

    /// Map every element to a stream and flatten the results in order.
    ///
    /// Not lazy across elements: the source is collected and every inner
    /// stream constructed when the derived stream opens, so that at most
    /// one inner stream is ever open at a time.
    pub fn flat_map<U, F>(self, f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Stream<U> + Send + 'static,
    {
        Stream::new(FlatMapProvider {
            src: Some(self),
            f,
            inner: None,
        })
    }
}
