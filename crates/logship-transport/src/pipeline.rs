use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::exchange::ExchangeOutcome;

/// Collector status announcing this client version is deprecated.
pub const STATUS_DEPRECATED: u16 = 301;

/// Collector status announcing this client version is no longer accepted.
pub const STATUS_RETIRED: u16 = 410;

/// Default maximum number of queued payloads per stream.
pub const DEFAULT_BACKLOG_CAPACITY: usize = 1024;

/// What to discard when a payload arrives at a full backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued payload to make room.
    #[default]
    DropOldest,
    /// Discard the arriving payload.
    DropNewest,
}

/// Pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum queued payloads while an exchange is outstanding.
    pub backlog_capacity: usize,
    /// Overflow behavior at capacity.
    pub overflow: OverflowPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            backlog_capacity: DEFAULT_BACKLOG_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

/// Delivery counters for one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Exchanges started.
    pub dispatched: u64,
    /// Exchanges answered with a non-error status.
    pub delivered: u64,
    /// Exchanges rejected or failed at the network level.
    pub failed: u64,
    /// Payloads discarded without an exchange.
    pub dropped: u64,
}

/// Result of handing a payload to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The pipeline was idle: send this payload now.
    Dispatch(String),
    /// An exchange is outstanding; the payload waits in the backlog.
    Queued,
    /// The stream is disabled or the backlog overflowed.
    Dropped,
}

/// Operator-facing condition raised by an exchange outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The collector rejected a submission.
    Rejected { status: u16 },
    /// The collector no longer accepts this client version.
    Retired,
    /// The collector flagged this client version as deprecated.
    Deprecated,
    /// The exchange produced no response.
    NetworkFailure { reason: String },
    /// The stream stopped calling the collector; queued payloads were lost.
    Disabled { discarded: usize },
}

impl Notice {
    /// Report through the tracing dispatcher. Every notice is a warning:
    /// delivery trouble never fails the logging call that caused it.
    pub fn emit(&self) {
        match self {
            Notice::Rejected { status } => {
                tracing::warn!(status = *status, "{self}");
            }
            Notice::NetworkFailure { reason } => {
                tracing::warn!(reason = %reason, "{self}");
            }
            Notice::Retired | Notice::Deprecated | Notice::Disabled { .. } => {
                tracing::warn!("{self}");
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Rejected { status } => write!(f, "couldn't submit events (status {status})"),
            Notice::Retired => f.write_str("this version of logship is no longer supported"),
            Notice::Deprecated => {
                f.write_str("this version of logship is deprecated, consider upgrading")
            }
            Notice::NetworkFailure { reason } => write!(f, "collector unreachable: {reason}"),
            Notice::Disabled { discarded } => write!(
                f,
                "stream disabled after delivery failure ({discarded} queued events discarded)"
            ),
        }
    }
}

/// Outcome of [`Pipeline::complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Payload to send next, keeping the pipeline active.
    pub next: Option<String>,
    pub notices: Vec<Notice>,
}

/// Per-stream delivery state machine.
///
/// Idle until a payload is admitted, then active until an exchange
/// completes with nothing left to send. While active, payloads queue in
/// FIFO order. A failed exchange disables the stream for good: later
/// payloads are dropped and nothing further is sent.
#[derive(Debug)]
pub struct Pipeline {
    backlog: VecDeque<String>,
    active: bool,
    should_call: bool,
    config: PipelineConfig,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            backlog: VecDeque::new(),
            active: false,
            should_call: true,
            config,
            stats: PipelineStats::default(),
        }
    }

    /// Admit a serialized payload.
    pub fn submit(&mut self, payload: String) -> Admission {
        if !self.should_call {
            self.stats.dropped += 1;
            return Admission::Dropped;
        }

        if !self.active {
            self.active = true;
            self.stats.dispatched += 1;
            return Admission::Dispatch(payload);
        }

        if self.backlog.len() >= self.config.backlog_capacity {
            self.stats.dropped += 1;
            match self.config.overflow {
                OverflowPolicy::DropNewest => return Admission::Dropped,
                OverflowPolicy::DropOldest => {
                    if self.backlog.pop_front().is_none() {
                        return Admission::Dropped;
                    }
                }
            }
        }

        self.backlog.push_back(payload);
        Admission::Queued
    }

    /// Apply the outcome of the outstanding exchange.
    ///
    /// A completion arriving while idle has no exchange to belong to and is
    /// ignored.
    pub fn complete(&mut self, outcome: ExchangeOutcome) -> Completion {
        if !self.active {
            tracing::debug!(?outcome, "completion without outstanding exchange ignored");
            return Completion::default();
        }

        let mut notices = Vec::new();
        match outcome {
            ExchangeOutcome::Failed(reason) => {
                self.stats.failed += 1;
                notices.push(Notice::NetworkFailure { reason });
                notices.push(self.disable());
                Completion {
                    next: None,
                    notices,
                }
            }
            ExchangeOutcome::Status(status) if status >= 400 => {
                self.stats.failed += 1;
                notices.push(Notice::Rejected { status });
                if status == STATUS_RETIRED {
                    notices.push(Notice::Retired);
                }
                notices.push(self.disable());
                Completion {
                    next: None,
                    notices,
                }
            }
            ExchangeOutcome::Status(status) => {
                self.stats.delivered += 1;
                if status == STATUS_DEPRECATED {
                    notices.push(Notice::Deprecated);
                }
                let next = self.backlog.pop_front();
                match next {
                    Some(_) => self.stats.dispatched += 1,
                    None => self.active = false,
                }
                Completion { next, notices }
            }
        }
    }

    fn disable(&mut self) -> Notice {
        self.active = false;
        self.should_call = false;
        let discarded = self.backlog.len();
        self.backlog.clear();
        self.stats.dropped += discarded as u64;
        Notice::Disabled { discarded }
    }

    pub fn is_idle(&self) -> bool {
        !self.active
    }

    pub fn is_disabled(&self) -> bool {
        !self.should_call
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
