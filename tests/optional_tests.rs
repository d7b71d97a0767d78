use pullstream::stream::core::FnLifecycle;
use pullstream::{Lazy, OptionalExt, Stream, StreamContext, StreamError, StreamResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_validate_runs_only_when_present() {
    let present = Some(5);
    let absent: Option<i32> = None;

    assert_eq!(
        present.validate(|v| {
            if *v > 3 {
                Err(StreamError::Custom("too big".to_string()))
            } else {
                Ok(())
            }
        }),
        Err(StreamError::Custom("too big".to_string()))
    );
    assert_eq!(
        absent.validate(|_| Err(StreamError::Custom("unreachable".to_string()))),
        Ok(())
    );
}

#[test]
fn test_if_present() {
    let mut seen = None;
    Some(7).if_present(|v| seen = Some(v));
    assert_eq!(seen, Some(7));

    let mut touched = false;
    Option::<i32>::None.if_present(|_| touched = true);
    assert!(!touched);
}

#[test]
fn test_into_stream() {
    tokio_test::block_on(async {
        let ctx = StreamContext::new();
        assert_eq!(Some(3).into_stream().collect(&ctx).await.unwrap(), vec![3]);
        assert_eq!(
            Option::<i32>::None.into_stream().collect(&ctx).await.unwrap(),
            Vec::<i32>::new()
        );
    });
}

#[tokio::test]
async fn test_lazy_runs_nothing_until_forced() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let lazy: Lazy<i32> = Lazy::new(move |_ctx| {
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(1))
        })
    });
    drop(lazy);
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let counter = runs.clone();
    let lazy: Lazy<i32> = Lazy::new(move |_ctx| {
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Some(1))
        })
    });
    let ctx = StreamContext::new();
    assert_eq!(lazy.get(&ctx).await.unwrap(), Some(1));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_find_first_is_deferred_until_forced() {
    let opens = Arc::new(AtomicUsize::new(0));
    let o = opens.clone();
    let lazy = Stream::from_iter(vec![1, 2, 3])
        .subscribe_lifecycle(FnLifecycle::new(
            move |_ctx: &StreamContext| -> StreamResult<()> {
                o.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            || {},
        ))
        .find_first();

    // Nothing has been opened yet.
    assert_eq!(opens.load(Ordering::SeqCst), 0);

    let ctx = StreamContext::new();
    assert_eq!(lazy.get(&ctx).await.unwrap(), Some(1));
    assert_eq!(opens.load(Ordering::SeqCst), 1);
}
