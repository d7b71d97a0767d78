//! K-way sorted merge over already-sorted inputs.

use async_trait::async_trait;
use std::cmp::Ordering;

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::{SequenceProvider, Stream};

struct MergeSortedProvider<T, F> {
    streams: Vec<Stream<T>>,
    cmp: F,
    peeked: Vec<Option<T>>,
    exhausted: Vec<bool>,
}

#[async_trait]
impl<T, F> SequenceProvider<T> for MergeSortedProvider<T, F>
where
    T: Send + 'static,
    F: FnMut(&T, &T) -> Ordering + Send,
{
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        // All inputs open together; every failure is collected.
        let mut failures = Vec::new();
        for stream in &mut self.streams {
            if let Err(e) = stream.open_all(ctx).await {
                failures.push(e);
            }
        }
        crate::error::combine_open_failures(failures)
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        // Refill only the slots consumed so far; an input that has ended
        // is flagged and never pulled again.
        for i in 0..self.streams.len() {
            if self.peeked[i].is_none() && !self.exhausted[i] {
                match self.streams[i].pull(ctx).await? {
                    Some(v) => self.peeked[i] = Some(v),
                    None => self.exhausted[i] = true,
                }
            }
        }

        // Minimum by the comparator; on ties the first input index wins.
        // Equal keys across inputs are both emitted, never deduplicated.
        let mut min_idx: Option<usize> = None;
        for i in 0..self.peeked.len() {
            if let Some(candidate) = &self.peeked[i] {
                let better = match min_idx {
                    None => true,
                    Some(m) => match &self.peeked[m] {
                        Some(best) => (self.cmp)(candidate, best) == Ordering::Less,
                        None => true,
                    },
                };
                if better {
                    min_idx = Some(i);
                }
            }
        }

        Ok(min_idx.and_then(|i| self.peeked[i].take()))
    }

    async fn close(&mut self) {
        for stream in &mut self.streams {
            stream.close_all().await;
        }
    }
}

/// Merge already-sorted inputs into one sequence ordered by `cmp`.
///
/// Assumes every input is sorted by the same comparator; at most one
/// buffered element is held per input. Ties break to the lowest input
/// index. Zero inputs yield an empty stream.
pub fn merge_sorted<T, F>(cmp: F, streams: Vec<Stream<T>>) -> Stream<T>
where
    T: Send + 'static,
    F: FnMut(&T, &T) -> Ordering + Send + 'static,
{
    if streams.is_empty() {
        return Stream::empty();
    }
    let n = streams.len();
    Stream::new(MergeSortedProvider {
        streams,
        cmp,
        peeked: (0..n).map(|_| None).collect(),
        exhausted: vec![false; n],
    })
}
