use std::fmt;
use std::str::FromStr;

use logship_transport::{PipelineConfig, TransportMode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamError};

/// When page metadata is sent ahead of a stream's events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageInfoPolicy {
    /// Never.
    #[default]
    Never,
    /// Before every event.
    PerEntry,
    /// Once per page lifetime, before the first event.
    PerPage,
}

impl PageInfoPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            PageInfoPolicy::Never => "never",
            PageInfoPolicy::PerEntry => "per-entry",
            PageInfoPolicy::PerPage => "per-page",
        }
    }
}

impl fmt::Display for PageInfoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageInfoPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "never" => Ok(PageInfoPolicy::Never),
            "per-entry" => Ok(PageInfoPolicy::PerEntry),
            "per-page" => Ok(PageInfoPolicy::PerPage),
            other => Err(format!("unknown page info policy: {other}")),
        }
    }
}

/// Configuration of one log stream. Immutable once the stream is built.
#[derive(Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Collector token; required and non-empty.
    pub token: String,
    /// Use `https` in standard transport mode. Default: true.
    pub use_tls: bool,
    pub page_info: PageInfoPolicy,
    /// Echo each event through tracing under [`crate::ECHO_TARGET`].
    pub echo: bool,
    /// Pin the collector host, bypassing the ambient override.
    pub endpoint: Option<String>,
    pub mode: TransportMode,
    pub pipeline: PipelineConfig,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub build: Option<String>,
    pub session_id: Option<String>,
    /// Device label; defaults to a description of the host.
    pub device: Option<String>,
}

impl StreamConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            use_tls: true,
            page_info: PageInfoPolicy::Never,
            echo: false,
            endpoint: None,
            mode: TransportMode::Standard,
            pipeline: PipelineConfig::default(),
            user_id: None,
            user_name: None,
            build: None,
            session_id: None,
            device: None,
        }
    }

    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    pub fn with_page_info(mut self, policy: PageInfoPolicy) -> Self {
        self.page_info = policy;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_user(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self.user_name = Some(name.into());
        self
    }

    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Reject configurations a stream cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(StreamError::MissingToken);
        }
        Ok(())
    }
}

impl fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConfig")
            .field(
                "token",
                &format_args!("<redacted:{} bytes>", self.token.len()),
            )
            .field("use_tls", &self.use_tls)
            .field("page_info", &self.page_info)
            .field("echo", &self.echo)
            .field("endpoint", &self.endpoint)
            .field("mode", &self.mode)
            .field("pipeline", &self.pipeline)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("build", &self.build)
            .field("session_id", &self.session_id)
            .field("device", &self.device)
            .finish()
    }
}
