//! Optional helpers and the deferred single-result [`Lazy`] value.
//!
//! The optional type of this crate *is* `std::option::Option` — `map`,
//! `filter`, `or`, `unwrap_or` and `unwrap_or_else` already cover the
//! combinators a stored-or-absent value needs. [`OptionalExt`] adds the
//! few operations the standard library lacks.

use futures::future::BoxFuture;

use crate::context::StreamContext;
use crate::error::StreamResult;
use crate::stream::core::Stream;

/// A deferred 0-or-1-result computation.
///
/// Nothing runs until [`Lazy::get`] forces it; a `Lazy` that is dropped
/// unforced never touches the underlying stream. `find_first` builds one
/// that cancels its stream as soon as a single element has been produced.
pub struct Lazy<T> {
    thunk: Box<dyn FnOnce(StreamContext) -> BoxFuture<'static, StreamResult<Option<T>>> + Send>,
}

impl<T: Send + 'static> Lazy<T> {
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce(StreamContext) -> BoxFuture<'static, StreamResult<Option<T>>> + Send + 'static,
    {
        Self {
            thunk: Box::new(thunk),
        }
    }

    /// Force the computation under `ctx`.
    pub async fn get(self, ctx: &StreamContext) -> StreamResult<Option<T>> {
        (self.thunk)(ctx.clone()).await
    }
}

/// Extensions on `Option<T>` used at the stream boundaries.
pub trait OptionalExt<T> {
    /// Run a fallible check only if a value is present; an absent value
    /// passes trivially.
    fn validate<E>(&self, check: impl FnOnce(&T) -> Result<(), E>) -> Result<(), E>;

    /// Run a side effect with the value if present.
    fn if_present(self, f: impl FnOnce(T));

    /// A 0/1-element stream over the value.
    fn into_stream(self) -> Stream<T>
    where
        T: Send + 'static;
}

impl<T> OptionalExt<T> for Option<T> {
    fn validate<E>(&self, check: impl FnOnce(&T) -> Result<(), E>) -> Result<(), E> {
        match self {
            Some(v) => check(v),
            None => Ok(()),
        }
    }

    fn if_present(self, f: impl FnOnce(T)) {
        if let Some(v) = self {
            f(v);
        }
    }

    fn into_stream(self) -> Stream<T>
    where
        T: Send + 'static,
    {
        match self {
            Some(v) => Stream::emit(v),
            None => Stream::empty(),
        }
    }
}
