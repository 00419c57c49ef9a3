use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::Event;
use crate::serializer::Guarded;

/// Wire format of `clientTimestamp`: microseconds and a numeric offset,
/// e.g. `2012-03-14T02:33:42.416587+00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Severity tag carried in the envelope `level` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Log,
    Info,
    Warn,
    Error,
    /// Reserved for synthetic page metadata envelopes.
    Page,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Log => "LOG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Page => "PAGE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOG" => Ok(Severity::Log),
            "INFO" => Ok(Severity::Info),
            "WARN" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "PAGE" => Ok(Severity::Page),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// An event plus its severity and enrichment fields.
///
/// Built fresh per call and consumed by serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub event: Event,
    pub level: Severity,
    pub client_timestamp: Option<String>,
    pub device: Option<String>,
    pub build: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Wire<'a> {
    data: Guarded<'a>,
    level: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_timestamp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
}

impl Envelope {
    /// A bare envelope with no enrichment.
    pub fn new(event: Event, level: Severity) -> Self {
        Self {
            event,
            level,
            client_timestamp: None,
            device: None,
            build: None,
            user_id: None,
            user_name: None,
            session_id: None,
        }
    }

    /// Stamp `clientTimestamp` with the local wall clock.
    pub fn stamped(mut self) -> Self {
        self.client_timestamp = Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());
        self
    }

    /// Serialize the envelope to its wire text.
    pub fn serialize(&self) -> Result<String> {
        let seen = RefCell::new(HashSet::new());
        let wire = Wire {
            data: Guarded::new(self.event.graph(), self.event.data(), &seen),
            level: self.level,
            client_timestamp: self.client_timestamp.as_deref(),
            device: self.device.as_deref(),
            build: self.build.as_deref(),
            user_id: self.user_id.as_deref(),
            user_name: self.user_name.as_deref(),
            session_id: self.session_id.as_deref(),
        };
        let text = serde_json::to_string(&wire)?;
        tracing::trace!(level = %self.level, bytes = text.len(), "envelope serialized");
        Ok(text)
    }
}
