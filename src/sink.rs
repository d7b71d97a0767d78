//! Streaming JSON array serialization.
//!
//! Writes a stream to any async sink as a syntactically valid JSON array,
//! one element at a time, without ever materializing the collection. The
//! opening bracket is deferred until the first element actually exists, so
//! an init hook (response headers, status line) can still run beforehand —
//! and it runs exactly once even for an empty stream. The first pull or
//! write error aborts *without* closing the array: a truncated body is a
//! failed request, not a short valid result.

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::Stream;

/// Write `stream` as a JSON array to `writer`.
pub async fn write_json_array<T, W>(
    ctx: &StreamContext,
    writer: &mut W,
    stream: Stream<T>,
) -> StreamResult<()>
where
    T: Serialize + Send + 'static,
    W: AsyncWrite + Unpin + Send,
{
    write_json_array_with_init(ctx, writer, stream, || Ok(())).await
}

/// Write `stream` as a JSON array to `writer`, invoking `init` exactly once
/// before the first byte of array content.
pub async fn write_json_array_with_init<T, W, F>(
    ctx: &StreamContext,
    writer: &mut W,
    mut stream: Stream<T>,
    init: F,
) -> StreamResult<()>
where
    T: Serialize + Send + 'static,
    W: AsyncWrite + Unpin + Send,
    F: FnOnce() -> StreamResult<()> + Send,
{
    let child = ctx.child();
    let mut init = Some(init);

    let opened = stream.open_all(&child).await;
    let result = match opened {
        Err(e) => Err(e),
        Ok(()) => drive(&child, &mut stream, writer, &mut init).await,
    };

    child.cancel();
    stream.close_all().await;
    result
}

async fn drive<T, W, F>(
    ctx: &StreamContext,
    stream: &mut Stream<T>,
    writer: &mut W,
    init: &mut Option<F>,
) -> StreamResult<()>
where
    T: Serialize + Send + 'static,
    W: AsyncWrite + Unpin + Send,
    F: FnOnce() -> StreamResult<()> + Send,
{
    let mut first = true;
    loop {
        if ctx.is_cancelled() {
            break;
        }
        match stream.pull(ctx).await? {
            Some(v) => {
                if first {
                    if let Some(f) = init.take() {
                        f()?;
                    }
                    writer.write_all(b"[").await?;
                    first = false;
                } else {
                    writer.write_all(b",").await?;
                }
                let raw = serde_json::to_vec(&v)?;
                writer.write_all(&raw).await?;
            }
            None => break,
        }
    }

    // An empty stream still produces a valid `[]` and still runs the init
    // hook, so callers cannot tell "empty" from "never started".
    if first {
        if let Some(f) = init.take() {
            f()?;
        }
        writer.write_all(b"[]").await?;
    } else {
        writer.write_all(b"]").await?;
    }
    writer.flush().await?;
    Ok(())
}
