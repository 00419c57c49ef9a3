use clap::{Args, Subcommand, ValueEnum};
use logship_event::Severity;
use logship_stream::PageInfoPolicy;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod digest;
pub mod envinfo;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one event to a collector.
    Send(SendArgs),
    /// Print the MD5 or HMAC-MD5 digest of a string.
    Digest(DigestArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Send(args) => send::run(args, format),
        Command::Digest(args) => digest::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

/// Severities a caller may log at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    #[default]
    Log,
    Info,
    Warn,
    Error,
}

impl From<LevelArg> for Severity {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Log => Severity::Log,
            LevelArg::Info => Severity::Info,
            LevelArg::Warn => Severity::Warn,
            LevelArg::Error => Severity::Error,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Collector token.
    #[arg(env = "LOGSHIP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Event severity.
    #[arg(long, value_enum, default_value_t = LevelArg::Log)]
    pub level: LevelArg,
    /// JSON value to log; repeat for a multi-value event.
    #[arg(long, conflicts_with = "data")]
    pub json: Vec<String>,
    /// String value to log; repeat for a multi-value event.
    #[arg(long, conflicts_with = "json")]
    pub data: Vec<String>,
    /// Collector host, e.g. `logs.example.com/v1`. Overrides LOGSHIP_ENDPOINT.
    #[arg(long, value_name = "HOST")]
    pub endpoint: Option<String>,
    /// Submit over plain http.
    #[arg(long)]
    pub insecure: bool,
    /// When host metadata is sent ahead of the event.
    #[arg(long, value_name = "POLICY", default_value = "never")]
    pub page_info: PageInfoPolicy,
    /// Echo the envelope to stderr.
    #[arg(long)]
    pub echo: bool,
    /// Maximum time to wait for delivery (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Text to digest.
    pub input: String,
    /// Key for HMAC-MD5; empty means plain MD5.
    #[arg(long)]
    pub key: Option<String>,
    /// Write the 16 raw digest bytes instead of hex.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}
