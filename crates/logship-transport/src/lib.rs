//! Single-flight, per-stream HTTP delivery pipeline.
//!
//! Each stream owns one [`Pipeline`]: a FIFO backlog of serialized payloads
//! and an active flag guaranteeing at most one outstanding exchange. The
//! pipeline itself performs no I/O; a [`Dispatcher`] drives it on a tokio
//! runtime through an [`Exchange`] implementation, [`HttpExchange`] by
//! default.
//!
//! Response handling:
//! - status `< 400`: delivered; the next backlog entry is dispatched
//! - status `301`: delivered, with a deprecation warning
//! - status `>= 400`: rejected; the stream stops calling the collector
//! - status `410`: rejected, and this client version is retired
//! - no response: the stream stops calling the collector

pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod exchange;
pub mod pipeline;
pub mod submission;

pub use dispatcher::Dispatcher;
pub use endpoint::{EndpointResolver, Scheme, TransportMode, DEFAULT_ENDPOINT, ENDPOINT_ENV};
pub use error::{Result, TransportError};
pub use exchange::{Exchange, ExchangeOutcome, HttpExchange};
pub use pipeline::{
    Admission, Completion, Notice, OverflowPolicy, Pipeline, PipelineConfig, PipelineStats,
    DEFAULT_BACKLOG_CAPACITY, STATUS_DEPRECATED, STATUS_RETIRED,
};
pub use submission::{Submission, CONTENT_TYPE};
