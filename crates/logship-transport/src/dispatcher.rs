use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::endpoint::EndpointResolver;
use crate::error::{Result, TransportError};
use crate::exchange::Exchange;
use crate::pipeline::{Admission, Pipeline, PipelineConfig, PipelineStats};
use crate::submission::Submission;

struct Shared {
    pipeline: Mutex<Pipeline>,
    settled: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Pipeline> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Target {
    token: String,
    resolver: EndpointResolver,
}

impl Target {
    fn submission(&self, payload: String) -> Submission {
        Submission::signed(self.resolver.url(&self.token), &self.token, payload)
            .for_mode(self.resolver.mode())
    }
}

/// Drives one stream's [`Pipeline`] on a tokio runtime.
///
/// [`Dispatcher::submit`] never waits on the network: it either spawns the
/// exchange task or leaves the payload in the backlog for that task. The
/// task holds only a weak reference to the pipeline, so completions that
/// arrive after the dispatcher is dropped are discarded.
pub struct Dispatcher<E: Exchange> {
    shared: Arc<Shared>,
    exchange: Arc<E>,
    target: Arc<Target>,
    runtime: Handle,
}

impl<E: Exchange> Dispatcher<E> {
    pub fn new(
        exchange: Arc<E>,
        token: impl Into<String>,
        resolver: EndpointResolver,
        config: PipelineConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                pipeline: Mutex::new(Pipeline::with_config(config)),
                settled: Notify::new(),
            }),
            exchange,
            target: Arc::new(Target {
                token: token.into(),
                resolver,
            }),
            runtime,
        }
    }

    /// Like [`Dispatcher::new`], on the runtime of the calling context.
    pub fn current(
        exchange: Arc<E>,
        token: impl Into<String>,
        resolver: EndpointResolver,
        config: PipelineConfig,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        Ok(Self::new(exchange, token, resolver, config, runtime))
    }

    /// Hand a serialized payload to the pipeline.
    pub fn submit(&self, payload: String) -> Admission {
        let admission = self.shared.lock().submit(payload);
        match &admission {
            Admission::Dispatch(payload) => {
                tracing::trace!(bytes = payload.len(), "dispatching exchange");
                self.runtime.spawn(drive(
                    Arc::downgrade(&self.shared),
                    Arc::clone(&self.exchange),
                    Arc::clone(&self.target),
                    payload.clone(),
                ));
            }
            Admission::Queued => tracing::trace!("exchange outstanding, payload queued"),
            Admission::Dropped => tracing::debug!("payload dropped"),
        }
        admission
    }

    /// Wait until no exchange is outstanding. Returns false on timeout.
    pub async fn settle(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.shared.settled.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.shared.lock().is_idle() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    pub fn is_idle(&self) -> bool {
        self.shared.lock().is_idle()
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.lock().is_disabled()
    }

    pub fn backlog_len(&self) -> usize {
        self.shared.lock().backlog_len()
    }

    pub fn stats(&self) -> PipelineStats {
        self.shared.lock().stats()
    }

    pub fn token(&self) -> &str {
        &self.target.token
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.target.resolver
    }
}

impl<E: Exchange> std::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("token", &format_args!("<redacted:{} bytes>", self.target.token.len()))
            .field("resolver", &self.target.resolver)
            .finish_non_exhaustive()
    }
}

async fn drive<E: Exchange>(
    shared: Weak<Shared>,
    exchange: Arc<E>,
    target: Arc<Target>,
    mut payload: String,
) {
    loop {
        let outcome = exchange.exchange(target.submission(payload)).await;

        let Some(shared) = shared.upgrade() else {
            tracing::debug!(?outcome, "stream torn down, completion discarded");
            return;
        };

        let completion = shared.lock().complete(outcome);
        for notice in &completion.notices {
            notice.emit();
        }

        match completion.next {
            Some(next) => payload = next,
            None => {
                shared.settled.notify_waiters();
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;

    use tokio::sync::oneshot;

    use super::*;
    use crate::endpoint::{Scheme, TransportMode};
    use crate::exchange::ExchangeOutcome;

    /// Exchange whose completions are released by the test.
    #[derive(Default)]
    struct ScriptedExchange {
        sent: Mutex<Vec<Submission>>,
        pending: Mutex<VecDeque<oneshot::Sender<ExchangeOutcome>>>,
    }

    impl ScriptedExchange {
        fn bodies(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.body_text().to_string())
                .collect()
        }

        fn pending(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        fn release(&self, outcome: ExchangeOutcome) {
            let sender = self
                .pending
                .lock()
                .unwrap()
                .pop_front()
                .expect("an exchange should be outstanding");
            let _ = sender.send(outcome);
        }
    }

    impl Exchange for ScriptedExchange {
        fn exchange(
            &self,
            submission: Submission,
        ) -> impl Future<Output = ExchangeOutcome> + Send {
            let (tx, rx) = oneshot::channel();
            self.sent.lock().unwrap().push(submission);
            self.pending.lock().unwrap().push_back(tx);
            async move {
                rx.await
                    .unwrap_or_else(|_| ExchangeOutcome::Failed("cancelled".into()))
            }
        }
    }

    fn dispatcher(exchange: &Arc<ScriptedExchange>) -> Dispatcher<ScriptedExchange> {
        Dispatcher::current(
            Arc::clone(exchange),
            "test_token",
            EndpointResolver::new(true).with_ambient(|| None),
            PipelineConfig::default(),
        )
        .expect("test runs inside a runtime")
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if condition() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn second_payload_waits_for_first_exchange() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        assert!(matches!(dispatcher.submit("one".into()), Admission::Dispatch(_)));
        assert_eq!(dispatcher.submit("two".into()), Admission::Queued);

        wait_until(|| exchange.pending() == 1).await;
        assert_eq!(exchange.bodies(), vec!["one"]);

        exchange.release(ExchangeOutcome::Status(200));
        wait_until(|| exchange.pending() == 1 && exchange.bodies().len() == 2).await;
        assert_eq!(exchange.bodies(), vec!["one", "two"]);

        exchange.release(ExchangeOutcome::Status(200));
        assert!(dispatcher.settle(Duration::from_secs(1)).await);
        assert_eq!(dispatcher.stats().delivered, 2);
    }

    #[tokio::test]
    async fn network_failure_prevents_queued_payload() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        dispatcher.submit("one".into());
        dispatcher.submit("two".into());
        wait_until(|| exchange.pending() == 1).await;

        exchange.release(ExchangeOutcome::Failed("connection refused".into()));
        assert!(dispatcher.settle(Duration::from_secs(1)).await);
        assert!(dispatcher.is_disabled());

        assert_eq!(dispatcher.submit("three".into()), Admission::Dropped);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(exchange.bodies(), vec!["one"]);
    }

    #[tokio::test]
    async fn deprecated_status_drains_queue() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        dispatcher.submit("one".into());
        dispatcher.submit("two".into());
        wait_until(|| exchange.pending() == 1).await;

        exchange.release(ExchangeOutcome::Status(301));
        wait_until(|| exchange.bodies().len() == 2 && exchange.pending() == 1).await;
        exchange.release(ExchangeOutcome::Status(200));

        assert!(dispatcher.settle(Duration::from_secs(1)).await);
        assert!(!dispatcher.is_disabled());
    }

    #[tokio::test]
    async fn submissions_are_signed_for_the_stream() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        dispatcher.submit(r#"{"data":"hi"}"#.into());
        wait_until(|| exchange.pending() == 1).await;

        let sent = exchange.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.url, "https://localhost:8080/v1/logs/test_token");
        assert_eq!(sent.header("X-Product-Key"), Some("test_token"));
        assert_eq!(sent.header("X-Requested-With"), None);
        exchange.release(ExchangeOutcome::Status(200));
    }

    #[tokio::test]
    async fn legacy_mode_mirrors_page_scheme_and_marks_request() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = Dispatcher::current(
            Arc::clone(&exchange),
            "test_token",
            EndpointResolver::new(true)
                .with_mode(TransportMode::Legacy {
                    page_scheme: Scheme::Http,
                })
                .with_ambient(|| None),
            PipelineConfig::default(),
        )
        .expect("test runs inside a runtime");

        dispatcher.submit(r#"{"data":"hi"}"#.into());
        wait_until(|| exchange.pending() == 1).await;

        let sent = exchange.sent.lock().unwrap()[0].clone();
        assert_eq!(sent.url, "http://localhost:8080/v1/logs/test_token");
        assert_eq!(sent.header("X-Requested-With"), Some("XMLHttpRequest"));
        exchange.release(ExchangeOutcome::Status(200));
    }

    #[tokio::test]
    async fn completion_after_teardown_is_a_noop() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        dispatcher.submit("one".into());
        dispatcher.submit("two".into());
        wait_until(|| exchange.pending() == 1).await;

        drop(dispatcher);
        exchange.release(ExchangeOutcome::Status(200));
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(exchange.bodies(), vec!["one"]);
        assert_eq!(exchange.pending(), 0);
    }

    #[tokio::test]
    async fn settle_times_out_while_exchange_hangs() {
        let exchange = Arc::new(ScriptedExchange::default());
        let dispatcher = dispatcher(&exchange);

        dispatcher.submit("one".into());
        wait_until(|| exchange.pending() == 1).await;

        assert!(!dispatcher.settle(Duration::from_millis(20)).await);
        assert!(!dispatcher.is_idle());
    }

    #[test]
    fn current_requires_runtime() {
        let exchange = Arc::new(ScriptedExchange::default());
        let result = Dispatcher::current(
            exchange,
            "t",
            EndpointResolver::new(true),
            PipelineConfig::default(),
        );
        assert!(matches!(result, Err(TransportError::NoRuntime)));
    }
}
