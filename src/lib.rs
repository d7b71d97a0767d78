//! pullstream — a lazy pull-stream engine with explicit resource lifecycle.
//!
//! Streams pair a pull provider with an ordered list of lifecycle elements:
//! nothing is pulled before everything has been opened, and everything is
//! closed exactly once however consumption ends. Combinators derive new
//! streams that carry the lifecycle over; multi-source combinators (concat,
//! sorted merge, clustering) compose several streams under one lifecycle
//! discipline; the channel bridge adapts push-style sources with bounded
//! buffering and a backpressure deadline; and the JSON sink serializes a
//! stream straight into a response body without materializing it.

pub mod collectors;
pub mod context;
pub mod error;
pub mod optional;
pub mod record;
pub mod sink;
pub mod stream;

pub use collectors::collect_count_grouped_by;
pub use context::StreamContext;
pub use error::{StreamError, StreamResult};
pub use optional::{Lazy, OptionalExt};
pub use record::{dates_between, DatedRecord, Entry};
pub use sink::{write_json_array, write_json_array_with_init};
pub use stream::*;
