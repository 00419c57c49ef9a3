//! Client-side log shipping.
//!
//! logship turns logged values into signed JSON envelopes and delivers them
//! to a collector, one exchange at a time per stream.
//!
//! # Crate Structure
//!
//! - [`digest`]: MD5 and HMAC-MD5 used to sign submissions
//! - [`event`]: value graphs, cycle-safe serialization, and envelopes
//! - [`transport`]: endpoint resolution and the single-flight delivery pipeline
//! - [`stream`]: named streams and the stream registry

/// Re-export digest types.
pub mod digest {
    pub use logship_digest::*;
}

/// Re-export event types.
pub mod event {
    pub use logship_event::*;
}

/// Re-export transport types.
pub mod transport {
    pub use logship_transport::*;
}

/// Re-export stream types.
pub mod stream {
    pub use logship_stream::*;
}
