//! The lazy pull-stream engine: core type, lifecycle, combinators.

pub mod channel;
pub mod cluster;
pub mod combinators;
pub mod concat;
pub mod constructors;
pub mod core;
pub mod merge;

pub use channel::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_ALLOWED_READER_DELAY};
pub use cluster::{cluster_sorted, group_adjacent_by, ClusterReducer, ClusterRun};
pub use concat::concat;
pub use core::{FnLifecycle, SequenceProvider, Stream, StreamLifecycle};
pub use merge::merge_sorted;
