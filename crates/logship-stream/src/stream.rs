use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use logship_event::{Envelope, Event, Graph, Severity, Value};
use logship_transport::{
    Dispatcher, EndpointResolver, Exchange, HttpExchange, PipelineStats, TransportError,
};
use tokio::runtime::Handle;

use crate::config::{PageInfoPolicy, StreamConfig};
use crate::error::Result;
use crate::page_info::{HostInfo, PageInfoSource};

/// Tracing target used when echoing events.
pub const ECHO_TARGET: &str = "logship::echo";

const PAGE_FIELDS: [&str; 2] = ["screen", "browser"];

/// One configured destination with its own delivery pipeline.
pub struct LogStream<E: Exchange = HttpExchange> {
    config: StreamConfig,
    dispatcher: Dispatcher<E>,
    page_info: Arc<dyn PageInfoSource>,
    sent_page_info: AtomicBool,
}

impl LogStream<HttpExchange> {
    /// Build a stream delivering over HTTP on the current tokio runtime.
    pub fn new(config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let exchange = Arc::new(HttpExchange::new()?);
        Self::with_exchange(config, exchange)
    }
}

impl<E: Exchange> LogStream<E> {
    /// Build a stream on the current tokio runtime.
    pub fn with_exchange(config: StreamConfig, exchange: Arc<E>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        Self::with_runtime(config, exchange, runtime)
    }

    /// Build a stream whose exchanges run on `runtime`.
    pub fn with_runtime(config: StreamConfig, exchange: Arc<E>, runtime: Handle) -> Result<Self> {
        config.validate()?;

        let resolver = EndpointResolver::new(config.use_tls)
            .with_mode(config.mode)
            .with_endpoint(config.endpoint.clone());
        let dispatcher = Dispatcher::new(
            exchange,
            config.token.clone(),
            resolver,
            config.pipeline,
            runtime,
        );

        Ok(Self {
            config,
            dispatcher,
            page_info: Arc::new(HostInfo),
            sent_page_info: AtomicBool::new(false),
        })
    }

    /// Replace the page metadata source.
    pub fn with_page_info_source(mut self, source: Arc<dyn PageInfoSource>) -> Self {
        self.page_info = source;
        self
    }

    /// Enrich, serialize, and submit one event.
    ///
    /// Returns immediately. Depending on the page info policy a `PAGE`
    /// envelope is submitted first.
    pub fn send(&self, level: Severity, event: Event) {
        if level != Severity::Page {
            self.send_page_info(&event);
        }
        let envelope = self.enrich(Envelope::new(event, level));
        let Some(payload) = serialize(&envelope) else {
            return;
        };
        if self.config.echo {
            echo(level, &payload);
        }
        self.dispatcher.submit(payload);
    }

    /// Positional-argument form of [`LogStream::send`]: one value is sent
    /// as-is, several are sent as a sequence.
    pub fn send_args(&self, level: Severity, graph: Graph, values: Vec<Value>) -> Result<()> {
        let event = Event::from_args(graph, values)?;
        self.send(level, event);
        Ok(())
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

    /// Start a new page lifetime: `per-page` metadata is sent again.
    pub fn new_page(&self) {
        self.sent_page_info.store(false, Ordering::SeqCst);
    }

    /// Wait until no exchange is outstanding. Returns false on timeout.
    pub async fn settle(&self, timeout: Duration) -> bool {
        self.dispatcher.settle(timeout).await
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn stats(&self) -> PipelineStats {
        self.dispatcher.stats()
    }

    pub fn is_disabled(&self) -> bool {
        self.dispatcher.is_disabled()
    }

    pub fn is_idle(&self) -> bool {
        self.dispatcher.is_idle()
    }

    /// Submission URL as it would resolve right now.
    pub fn url(&self) -> String {
        self.dispatcher.resolver().url(&self.config.token)
    }

    /// Submit page metadata ahead of `event` when the policy asks for it.
    /// An event that already carries page fields counts as the metadata.
    fn send_page_info(&self, event: &Event) {
        match self.config.page_info {
            PageInfoPolicy::Never => return,
            PageInfoPolicy::PerEntry => self.sent_page_info.store(true, Ordering::SeqCst),
            PageInfoPolicy::PerPage => {
                if self.sent_page_info.swap(true, Ordering::SeqCst) {
                    return;
                }
            }
        }
        if carries_page_fields(event) {
            return;
        }

        let event = Event::json(self.page_info.page_info());
        let envelope = self.enrich(Envelope::new(event, Severity::Page));
        if let Some(payload) = serialize(&envelope) {
            self.dispatcher.submit(payload);
        }
    }

    fn enrich(&self, mut envelope: Envelope) -> Envelope {
        envelope.device = Some(
            self.config
                .device
                .clone()
                .unwrap_or_else(default_device),
        );
        envelope.build = self.config.build.clone();
        envelope.user_id = self.config.user_id.clone();
        envelope.user_name = self.config.user_name.clone();
        envelope.session_id = self.config.session_id.clone();
        envelope.stamped()
    }
}

impl<E: Exchange> std::fmt::Debug for LogStream<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStream")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

fn serialize(envelope: &Envelope) -> Option<String> {
    match envelope.serialize() {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::warn!(error = %err, level = %envelope.level, "event dropped");
            None
        }
    }
}

fn echo(level: Severity, payload: &str) {
    match level {
        Severity::Error => tracing::error!(target: ECHO_TARGET, "{payload}"),
        Severity::Warn => tracing::warn!(target: ECHO_TARGET, "{payload}"),
        Severity::Log | Severity::Info => tracing::info!(target: ECHO_TARGET, "{payload}"),
        Severity::Page => {}
    }
}

fn carries_page_fields(event: &Event) -> bool {
    match event.data() {
        Value::Object(id) => PAGE_FIELDS
            .iter()
            .any(|key| event.graph().get(*id, key).is_some()),
        _ => false,
    }
}

fn default_device() -> String {
    format!("Host: {}/{}", std::env::consts::OS, std::env::consts::ARCH)
}
