//! Sequential concatenation of multiple streams.

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::{SequenceProvider, Stream};

struct ConcatProvider<T> {
    streams: VecDeque<Stream<T>>,
}

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for ConcatProvider<T> {
    async fn open(&mut self, ctx: &StreamContext) -> StreamResult<()> {
        // Only the first input is opened; the rest wait their turn.
        match self.streams.front_mut() {
            Some(first) => first.open_all(ctx).await,
            None => Ok(()),
        }
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        loop {
            let current = match self.streams.front_mut() {
                Some(s) => s,
                None => return Ok(None),
            };
            match current.pull(ctx).await? {
                Some(v) => return Ok(Some(v)),
                None => {
                    // Current input exhausted: close it before the next
                    // one is opened, so at most one is ever open.
                    if let Some(mut done) = self.streams.pop_front() {
                        done.close_all().await;
                    }
                    if let Some(next) = self.streams.front_mut() {
                        if let Err(e) = next.open_all(ctx).await {
                            // Whatever did open gets released; the rest of
                            // the inputs were never opened.
                            next.close_all().await;
                            self.streams.clear();
                            return Err(e);
                        }
                    } else {
                        return Ok(None);
                    }
                }
            }
        }
    }

    async fn close(&mut self) {
        // Only the current input can be open.
        if let Some(current) = self.streams.front_mut() {
            current.close_all().await;
        }
    }
}

/// Concatenate streams, exhausting each input fully and in order before the
/// next one is opened. Zero inputs yield an empty stream.
pub fn concat<T: Send + 'static>(streams: Vec<Stream<T>>) -> Stream<T> {
    if streams.is_empty() {
        return Stream::empty();
    }
    Stream::new(ConcatProvider {
        streams: streams.into(),
    })
}
