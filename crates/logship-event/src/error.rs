/// Errors that can occur while building or serializing events.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A multi-value event was built from zero values.
    #[error("event requires at least one value")]
    NoArguments,

    /// The JSON writer rejected the envelope.
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EventError>;
