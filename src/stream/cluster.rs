//! Clustering of consecutive same-key runs in an already-grouped stream.
//!
//! The input must be grouped (consecutive-equal, not necessarily globally
//! sorted) by the classifier key. Each maximal run is handed to a reducer
//! as a lazily driven [`ClusterRun`] sharing the parent's provider, and the
//! reducer's single output (or none) becomes one output element. If the
//! reducer returns without draining its run, the parent drains the
//! remainder itself before moving on, so the next cluster always starts at
//! a run boundary.

use async_trait::async_trait;

use crate::context::StreamContext;
use crate::error::{StreamError, StreamResult};
use crate::stream::core::{SequenceProvider, Stream};

/// One maximal consecutive run of same-key elements. Pulling from it
/// advances the parent stream.
pub struct ClusterRun<'a, T, C> {
    src: &'a mut Stream<T>,
    next_item: &'a mut Option<T>,
    classify: &'a (dyn Fn(&T) -> C + Send + Sync),
    key: &'a C,
}

impl<'a, T, C> ClusterRun<'a, T, C>
where
    T: Send + 'static,
    C: PartialEq,
{
    /// The next element of this run, or `None` once the run ends (the
    /// following element has a different key, or the parent is exhausted).
    pub async fn next(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        let belongs = match self.next_item.as_ref() {
            None => false,
            Some(v) => (self.classify)(v) == *self.key,
        };
        if !belongs {
            return Ok(None);
        }
        let item = self.next_item.take();
        *self.next_item = self.src.pull(ctx).await?;
        Ok(item)
    }
}

/// Reduces one cluster to at most one output element.
#[async_trait]
pub trait ClusterReducer<T, C, O>: Send {
    async fn reduce(
        &mut self,
        ctx: &StreamContext,
        key: &C,
        run: &mut ClusterRun<'_, T, C>,
    ) -> StreamResult<Option<O>>;
}

struct ClusterProvider<T, C, R> {
    src: Stream<T>,
    classify: Box<dyn Fn(&T) -> C + Send + Sync>,
    reducer: R,
    next_item: Option<T>,
}

#[async_trait]
impl<T, C, O, R> SequenceProvider<O> for ClusterProvider<T, C, R>
where
    T: Send + 'static,
    C: PartialEq + Send + Sync + 'static,
    O: Send + 'static,
    R: ClusterReducer<T, C, O>,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        self.src.open_all(ctx).await?;
        self.next_item = self.src.pull(ctx).await?;
        Ok(())
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<O>> {
        loop {
            let key = match &self.next_item {
                None => return Ok(None),
                Some(v) => (self.classify)(v),
            };

            let mut run = ClusterRun {
                src: &mut self.src,
                next_item: &mut self.next_item,
                classify: self.classify.as_ref(),
                key: &key,
            };

            // Reducer errors are wrapped so an inner failure can never be
            // mistaken for the end of the outer stream.
            let reduced = match self.reducer.reduce(ctx, &key, &mut run).await {
                Ok(out) => out,
                Err(e) => return Err(StreamError::Reduce(e.to_string())),
            };

            // Drain whatever the reducer left of the current run.
            while run.next(ctx).await?.is_some() {}

            if let Some(out) = reduced {
                return Ok(Some(out));
            }
        }
    }

    async fn close(&mut self) {
        self.src.close_all().await;
    }
}

/// Group consecutive same-key runs of `src` and reduce each run to at most
/// one output element.
pub fn cluster_sorted<T, C, O, R>(
    classifier: impl Fn(&T) -> C + Send + Sync + 'static,
    reducer: R,
    src: Stream<T>,
) -> Stream<O>
where
    T: Send + 'static,
    C: PartialEq + Send + Sync + 'static,
    O: Send + 'static,
    R: ClusterReducer<T, C, O> + 'static,
{
    Stream::new(ClusterProvider {
        src,
        classify: Box::new(classifier),
        reducer,
        next_item: None,
    })
}

struct CollectClusterReducer;

#[async_trait]
impl<T, C> ClusterReducer<T, C, (C, Vec<T>)> for CollectClusterReducer
where
    T: Send + 'static,
    C: PartialEq + Clone + Send + Sync + 'static,
{
    async fn reduce(
        &mut self,
        ctx: &StreamContext,
        key: &C,
        run: &mut ClusterRun<'_, T, C>,
    ) -> StreamResult<Option<(C, Vec<T>)>> {
        let mut items = Vec::new();
        while let Some(v) = run.next(ctx).await? {
            items.push(v);
        }
        Ok(Some((key.clone(), items)))
    }
}

/// Group adjacent elements sharing a key into `(key, elements)` pairs.
pub fn group_adjacent_by<T, C>(
    classifier: impl Fn(&T) -> C + Send + Sync + 'static,
    src: Stream<T>,
) -> Stream<(C, Vec<T>)>
where
    T: Send + 'static,
    C: PartialEq + Clone + Send + Sync + 'static,
{
    cluster_sorted(classifier, CollectClusterReducer, src)
}
