use std::future::Future;

use crate::error::Result;
use crate::submission::Submission;

/// How one network exchange ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The collector answered with this HTTP status.
    Status(u16),
    /// No response was obtained.
    Failed(String),
}

/// Performs one submission against the collector.
///
/// Implementations must not retry: the pipeline decides what happens next
/// from the single outcome returned.
pub trait Exchange: Send + Sync + 'static {
    fn exchange(&self, submission: Submission) -> impl Future<Output = ExchangeOutcome> + Send;
}

/// [`Exchange`] over HTTP(S) using `reqwest`.
///
/// Redirects are not followed, so a deprecation status reaches the
/// pipeline as-is. No request timeout is applied.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    client: reqwest::Client,
}

impl HttpExchange {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("logship/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client. It should not follow redirects.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Exchange for HttpExchange {
    fn exchange(&self, submission: Submission) -> impl Future<Output = ExchangeOutcome> + Send {
        let client = self.client.clone();
        async move {
            let Submission { url, body, headers } = submission;
            let mut request = client.post(&url).body(body);
            for (name, value) in headers {
                request = request.header(name, value);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::debug!(%url, status, "exchange completed");
                    ExchangeOutcome::Status(status)
                }
                Err(err) => {
                    tracing::debug!(%url, error = %err, "exchange failed");
                    ExchangeOutcome::Failed(err.to_string())
                }
            }
        }
    }
}
