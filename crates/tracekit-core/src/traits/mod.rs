//! Traits at the engine boundaries.

pub mod cancellation;
pub mod sink;
pub mod source;

pub use cancellation::{Cancellable, CancellationToken};
pub use sink::{IndexSink, JsonLinesSink, MemorySink};
pub use source::{RecordSource, StaticSource};
