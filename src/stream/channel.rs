//! Push-to-pull channel bridge with bounded buffering and a backpressure
//! deadline.
//!
//! Exactly one background worker per bridged stream shuttles elements from
//! the source channel into a bounded buffer. A consumer that stalls for
//! longer than the allowed delay fails the stream instead of letting the
//! buffer grow; cancelling the consuming context ends the stream cleanly.

use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::context::StreamContext;
use crate::error::{StreamError, StreamResult};
use crate::stream::core::{SequenceProvider, Stream};

pub const DEFAULT_MAX_ALLOWED_READER_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_BUFFER_SIZE: usize = 50;

struct ChannelSource<T> {
    source: Option<mpsc::Receiver<T>>,
    buffer: Option<mpsc::Receiver<T>>,
    slow: CancellationToken,
    max_allowed_reader_delay: Duration,
    buffer_size: usize,
}

#[async_trait]
impl<T: Send + 'static> SequenceProvider<T> for ChannelSource<T> {
    async fn open(&mut self, _ctx: &StreamContext) -> StreamResult<()> {
        let mut source = match self.source.take() {
            Some(s) => s,
            None => {
                return Err(StreamError::Custom(
                    "channel stream already opened".to_string(),
                ))
            }
        };

        let (tx, rx) = mpsc::channel(self.buffer_size.max(1));
        self.slow = CancellationToken::new();
        let slow = self.slow.clone();
        let delay = self.max_allowed_reader_delay;

        tokio::spawn(async move {
            while let Some(msg) = source.recv().await {
                match timeout(delay, tx.send(msg)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        debug!("bridge buffer dropped, stopping reader worker");
                        return;
                    }
                    Err(_) => {
                        slow.cancel();
                        debug!(
                            "stream closed due to max delay {:?} while writing to buffer",
                            delay
                        );
                        return;
                    }
                }
            }
            // Source finished; dropping the sender closes the buffer.
        });

        self.buffer = Some(rx);
        Ok(())
    }

    async fn emit(&mut self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        let slow = self.slow.clone();
        let delay = self.max_allowed_reader_delay;
        let buffer = match self.buffer.as_mut() {
            Some(b) => b,
            None => return Err(StreamError::Custom("channel stream not open".to_string())),
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!("stream context cancelled, finishing the stream");
                Ok(None)
            }
            _ = slow.cancelled() => Err(StreamError::ReaderTooSlow(delay)),
            msg = buffer.recv() => match msg {
                Some(m) => Ok(Some(m)),
                None => {
                    // The worker may have timed out and dropped the sender
                    // in the same instant; the slow flag wins.
                    if slow.is_cancelled() {
                        Err(StreamError::ReaderTooSlow(delay))
                    } else {
                        debug!("stream channel closed externally");
                        Err(StreamError::ClosedExternally)
                    }
                }
            }
        }
    }

    async fn close(&mut self) {
        // Fire-and-forget: dropping the buffer receiver makes any in-flight
        // worker send fail, so the worker exits on its own.
        self.buffer = None;
        debug!("closing channel stream source");
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Bridge a push-style channel into a pull stream using the default
    /// reader delay (1 s) and buffer size (50).
    pub fn from_channel(source: mpsc::Receiver<T>) -> Stream<T> {
        Stream::from_channel_with_opts(
            source,
            DEFAULT_MAX_ALLOWED_READER_DELAY,
            DEFAULT_BUFFER_SIZE,
        )
    }

    /// Bridge a push-style channel into a pull stream.
    ///
    /// The background worker gives up once the consumer has not freed buffer
    /// space for `max_allowed_reader_delay`; from then on the stream fails
    /// with [`StreamError::ReaderTooSlow`]. When the source channel closes,
    /// the stream fails with [`StreamError::ClosedExternally`] after the
    /// buffered elements have been drained.
    pub fn from_channel_with_opts(
        source: mpsc::Receiver<T>,
        max_allowed_reader_delay: Duration,
        buffer_size: usize,
    ) -> Stream<T> {
        Stream::new(ChannelSource {
            source: Some(source),
            buffer: None,
            slow: CancellationToken::new(),
            max_allowed_reader_delay,
            buffer_size,
        })
    }
}
