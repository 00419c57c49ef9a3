//! Named log streams.
//!
//! A [`LogStream`] binds a [`StreamConfig`] to one delivery pipeline and
//! turns logged values into enriched, serialized submissions. A
//! [`Registry`] owns streams by name for the lifetime of a session.

pub mod config;
pub mod error;
pub mod page_info;
pub mod registry;
pub mod stream;

pub use config::{PageInfoPolicy, StreamConfig};
pub use error::{Result, StreamError};
pub use page_info::{HostInfo, PageInfoSource, StaticPageInfo};
pub use registry::{Registry, DEFAULT_STREAM};
pub use stream::{LogStream, ECHO_TARGET};
