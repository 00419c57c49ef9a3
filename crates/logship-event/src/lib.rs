//! Event values, envelopes, and cycle-safe serialization.
//!
//! A logged value is an arbitrary graph: mappings and sequences may refer to
//! each other, including back to themselves. Composites live in a [`Graph`]
//! arena and are referenced by opaque handles, so self-reference is plain data
//! rather than shared ownership.
//!
//! Serialization never expands a composite twice: the second encounter in a
//! pass renders as [`CYCLE_MARKER`]. Absent values render as
//! [`UNDEFINED_MARKER`] instead of being dropped or turned into `null`.

pub mod envelope;
pub mod error;
pub mod event;
pub mod serializer;
pub mod value;

pub use envelope::{Envelope, Severity};
pub use error::{EventError, Result};
pub use event::Event;
pub use serializer::{to_json, Guarded, CYCLE_MARKER, MAX_DEPTH, UNDEFINED_MARKER};
pub use value::{ArrayId, Graph, Node, ObjectId, Value};
