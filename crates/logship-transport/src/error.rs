/// Errors that can occur while setting up delivery.
///
/// Delivery failures themselves never surface here: they are reported as
/// [`crate::Notice`]s and change pipeline state instead.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No tokio runtime is available to drive exchanges.
    #[error("no tokio runtime available to drive delivery")]
    NoRuntime,

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
