//! Terminal collectors beyond the plain `collect`/`count` on [`Stream`].

use std::collections::HashMap;

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::Stream;

/// Count elements per group key without retaining the elements.
pub async fn collect_count_grouped_by<T, F>(
    ctx: &StreamContext,
    stream: Stream<T>,
    mut grouper: F,
) -> StreamResult<HashMap<String, u64>>
where
    T: Send + 'static,
    F: FnMut(&T) -> String + Send,
{
    let mut result: HashMap<String, u64> = HashMap::new();
    stream
        .consume(ctx, |v| {
            *result.entry(grouper(&v)).or_insert(0) += 1;
        })
        .await?;
    Ok(result)
}
