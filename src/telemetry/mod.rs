mod batcher;
mod sink;

pub use batcher::{BatcherConfig, EventBatcher};
pub use sink::{EventSink, HttpSink, LogSink, TELEMETRY_TOKEN_HEADER};
