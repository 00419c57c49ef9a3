use logship_event::EventError;
use logship_transport::TransportError;

/// Errors that can occur when constructing or looking up streams.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The stream configuration carries no token.
    #[error("token is required and should be a non-empty string")]
    MissingToken,

    /// A stream was registered without a name.
    #[error("stream name is required")]
    MissingName,

    /// A stream with this name is already registered.
    #[error("a stream named {0:?} already exists")]
    DuplicateName(String),

    /// No stream is registered under this name.
    #[error("no stream named {0:?}")]
    UnknownName(String),

    /// Delivery could not be set up.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The logged arguments could not form an event.
    #[error("event error: {0}")]
    Event(#[from] EventError),
}

pub type Result<T> = std::result::Result<T, StreamError>;
