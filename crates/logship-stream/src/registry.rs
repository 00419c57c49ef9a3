use std::collections::BTreeMap;
use std::sync::Arc;

use logship_event::{Event, Severity};
use logship_transport::{Exchange, HttpExchange, TransportError};
use tokio::runtime::Handle;

use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::stream::LogStream;

/// Name used by [`Registry::init`] and by [`Registry::destroy`] with no name.
pub const DEFAULT_STREAM: &str = "default";

/// Name-keyed set of streams sharing one exchange and runtime.
///
/// Construct one per session and drop it (or call [`Registry::clear`]) on
/// shutdown. Destroying a stream discards its queued payloads; exchanges
/// already in flight complete without effect.
pub struct Registry<E: Exchange = HttpExchange> {
    exchange: Arc<E>,
    runtime: Handle,
    streams: BTreeMap<String, LogStream<E>>,
}

impl Registry<HttpExchange> {
    /// Registry delivering over HTTP on the current tokio runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        Ok(Self::with_exchange(Arc::new(HttpExchange::new()?), runtime))
    }
}

impl<E: Exchange> Registry<E> {
    pub fn with_exchange(exchange: Arc<E>, runtime: Handle) -> Self {
        Self {
            exchange,
            runtime,
            streams: BTreeMap::new(),
        }
    }

    /// Register a new stream under `name`.
    pub fn create(&mut self, name: &str, config: StreamConfig) -> Result<&LogStream<E>> {
        if name.trim().is_empty() {
            return Err(StreamError::MissingName);
        }
        if self.streams.contains_key(name) {
            return Err(StreamError::DuplicateName(name.to_string()));
        }

        let stream = LogStream::with_runtime(
            config,
            Arc::clone(&self.exchange),
            self.runtime.clone(),
        )?;
        tracing::debug!(stream = name, "stream created");
        Ok(self.streams.entry(name.to_string()).or_insert(stream))
    }

    /// Register the default stream with an otherwise default configuration.
    pub fn init(&mut self, token: impl Into<String>) -> Result<&LogStream<E>> {
        self.create(DEFAULT_STREAM, StreamConfig::new(token))
    }

    pub fn init_with(&mut self, config: StreamConfig) -> Result<&LogStream<E>> {
        self.create(DEFAULT_STREAM, config)
    }

    pub fn get(&self, name: &str) -> Result<&LogStream<E>> {
        self.streams
            .get(name)
            .ok_or_else(|| StreamError::UnknownName(name.to_string()))
    }

    /// Remove a stream; `None` names the default stream. Returns whether a
    /// stream was removed.
    pub fn destroy(&mut self, name: Option<&str>) -> bool {
        let name = name.unwrap_or(DEFAULT_STREAM);
        let removed = self.streams.remove(name).is_some();
        if removed {
            tracing::debug!(stream = name, "stream destroyed");
        }
        removed
    }

    /// Send one event to every registered stream.
    pub fn send(&self, level: Severity, event: Event) {
        for stream in self.streams.values() {
            stream.send(level, event.clone());
        }
    }

    pub fn log(&self, event: impl Into<Event>) {
        self.send(Severity::Log, event.into());
    }

    pub fn info(&self, event: impl Into<Event>) {
        self.send(Severity::Info, event.into());
    }

    pub fn warn(&self, event: impl Into<Event>) {
        self.send(Severity::Warn, event.into());
    }

    pub fn error(&self, event: impl Into<Event>) {
        self.send(Severity::Error, event.into());
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Destroy every stream.
    pub fn clear(&mut self) {
        let count = self.streams.len();
        self.streams.clear();
        tracing::debug!(count, "registry cleared");
    }
}

impl<E: Exchange> std::fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("streams", &self.streams.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
