use pullstream::{Stream, StreamContext, StreamError};

#[tokio::test]
async fn test_collect_from_iter() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4, 5]).collect(&ctx).await.unwrap();
    assert_eq!(result, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_empty_collect() {
    let ctx = StreamContext::new();
    let result = Stream::<i32>::empty().collect(&ctx).await.unwrap();
    assert_eq!(result, Vec::<i32>::new());
}

#[tokio::test]
async fn test_emit_single() {
    let ctx = StreamContext::new();
    let result = Stream::emit(42).collect(&ctx).await.unwrap();
    assert_eq!(result, vec![42]);
}

#[tokio::test]
async fn test_filter_then_collect() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4, 5])
        .filter(|i| *i > 2)
        .collect(&ctx)
        .await
        .unwrap();
    assert_eq!(result, vec![3, 4, 5]);
}

#[tokio::test]
async fn test_map_then_filter() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4, 5])
        .map(|i| i + 1)
        .filter(|i| *i > 2)
        .collect(&ctx)
        .await
        .unwrap();
    assert_eq!(result, vec![3, 4, 5, 6]);
}

#[tokio::test]
async fn test_try_map_error_propagates() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3])
        .try_map(|i| {
            if i == 2 {
                Err(StreamError::Custom("bad element".to_string()))
            } else {
                Ok(i * 10)
            }
        })
        .collect(&ctx)
        .await;
    assert_eq!(result, Err(StreamError::Custom("bad element".to_string())));
}

#[tokio::test]
async fn test_try_filter_error_is_wrapped_as_predicate() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3])
        .try_filter(|i| {
            if *i == 2 {
                Err(StreamError::Custom("boom".to_string()))
            } else {
                Ok(true)
            }
        })
        .collect(&ctx)
        .await;
    match result {
        Err(StreamError::Predicate(msg)) => assert!(msg.contains("boom")),
        other => panic!("expected predicate error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_limit() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4, 5])
        .limit(3)
        .collect(&ctx)
        .await
        .unwrap();
    assert_eq!(result, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_limit_larger_than_stream() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2]).limit(10).collect(&ctx).await.unwrap();
    assert_eq!(result, vec![1, 2]);
}

#[tokio::test]
async fn test_skip() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4, 5])
        .skip(2)
        .collect(&ctx)
        .await
        .unwrap();
    assert_eq!(result, vec![3, 4, 5]);
}

#[tokio::test]
async fn test_skip_past_the_end() {
    let ctx = StreamContext::new();
    let result = Stream::from_iter(vec![1, 2]).skip(5).collect(&ctx).await.unwrap();
    assert_eq!(result, Vec::<i32>::new());
}

#[tokio::test]
async fn test_count() {
    let ctx = StreamContext::new();
    let n = Stream::from_iter(0..100).count(&ctx).await.unwrap();
    assert_eq!(n, 100);
}

#[tokio::test]
async fn test_find_first() {
    let ctx = StreamContext::new();
    let first = Stream::from_iter(vec![7, 8, 9])
        .find_first()
        .get(&ctx)
        .await
        .unwrap();
    assert_eq!(first, Some(7));
}

#[tokio::test]
async fn test_find_first_on_empty() {
    let ctx = StreamContext::new();
    let first = Stream::<i32>::empty().find_first().get(&ctx).await.unwrap();
    assert_eq!(first, None);
}

#[tokio::test]
async fn test_find_last() {
    let ctx = StreamContext::new();
    let last = Stream::from_iter(vec![7, 8, 9])
        .find_last()
        .get(&ctx)
        .await
        .unwrap();
    assert_eq!(last, Some(9));
}

#[tokio::test]
async fn test_first_on_empty_is_absent() {
    let ctx = StreamContext::new();
    let result = Stream::<i32>::empty().first(&ctx).await;
    assert_eq!(result, Err(StreamError::Absent));
}

#[tokio::test]
async fn test_first_on_filtered_stream() {
    let ctx = StreamContext::new();
    let v = Stream::from_iter(vec![1, 2, 3, 4])
        .filter(|i| i % 2 == 0)
        .first(&ctx)
        .await
        .unwrap();
    assert_eq!(v, 2);
}

#[tokio::test]
async fn test_visitor_error_aborts_consumption() {
    let ctx = StreamContext::new();
    let mut seen = Vec::new();
    let result = Stream::from_iter(vec![1, 2, 3, 4])
        .try_consume(&ctx, |v| {
            if v == 3 {
                return Err(StreamError::Custom("stop here".to_string()));
            }
            seen.push(v);
            Ok(())
        })
        .await;
    assert_eq!(result, Err(StreamError::Custom("stop here".to_string())));
    assert_eq!(seen, vec![1, 2]);
}

#[tokio::test]
async fn test_from_futures_stream() {
    let ctx = StreamContext::new();
    let inner = futures_util::stream::iter(vec![1, 2, 3]);
    let result = Stream::from_futures_stream(inner).collect(&ctx).await.unwrap();
    assert_eq!(result, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_into_futures_stream_round_trip() {
    use futures_util::StreamExt;
    let mut s = Stream::from_iter(vec![1, 2, 3]).map(|i| i * 2).into_futures_stream();
    let mut out = Vec::new();
    while let Some(item) = s.next().await {
        out.push(item.unwrap());
    }
    assert_eq!(out, vec![2, 4, 6]);
}
