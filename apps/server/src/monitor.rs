//! Poll, compare and notify loop.

use crate::config::MonitorSettings;
use gas_alerts::{GasAlert, Notifier};
use gas_core::QuoteError;
use gas_feeds::{FeedError, GasOracle};
use std::sync::Arc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// Result of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Gas above threshold, nothing sent.
    Idle { gas: f64 },
    /// Alert delivered.
    Alerted { gas: f64 },
    /// Threshold crossed but delivery failed.
    AlertFailed { gas: f64 },
    /// No usable quote this cycle.
    Failed,
}

impl CycleOutcome {
    /// Only a delivered alert pauses polling.
    pub fn needs_cooldown(&self) -> bool {
        matches!(self, CycleOutcome::Alerted { .. })
    }
}

pub struct GasMonitor {
    oracle: Arc<dyn GasOracle>,
    notifier: Arc<dyn Notifier>,
    settings: MonitorSettings,
}

impl GasMonitor {
    pub fn new(
        oracle: Arc<dyn GasOracle>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            oracle,
            notifier,
            settings,
        }
    }

    /// Fetch one quote, compare it and alert if needed. Never fails; errors are logged.
    pub async fn poll_cycle(&self) -> CycleOutcome {
        let gas = match self.oracle.fetch_safe_gas_price().await {
            Ok(gas) => gas,
            Err(FeedError::Quote(QuoteError::UnexpectedStatus {
                status,
                message,
                detail,
            })) => {
                error!(
                    status = %status,
                    message = %message,
                    detail = %detail,
                    "Unexpected status from gas oracle"
                );
                return CycleOutcome::Failed;
            }
            Err(FeedError::Quote(e)) => {
                error!(error = %e, "Error parsing gas price");
                return CycleOutcome::Failed;
            }
            Err(e) => {
                error!(
                    error = %e,
                    transient = e.is_transient(),
                    "Error getting data from gas oracle"
                );
                return CycleOutcome::Failed;
            }
        };

        if !self.settings.threshold.is_triggered(gas) {
            debug!(gas, threshold = %self.settings.threshold, "Gas above threshold");
            return CycleOutcome::Idle { gas };
        }

        info!("Target gas reached: {:.4}", gas);

        match self.notifier.send_alert(&GasAlert::new(gas)).await {
            Ok(()) => CycleOutcome::Alerted { gas },
            Err(e) => {
                error!(error = %e, gas, "Error sending mail");
                CycleOutcome::AlertFailed { gas }
            }
        }
    }

    /// Run forever. The first poll happens one interval after start.
    pub async fn run(&self) {
        let interval = self.settings.poll_interval;
        info!(
            threshold = %self.settings.threshold,
            interval_secs = interval.as_secs(),
            cooldown_secs = self.settings.cooldown.as_secs(),
            "Starting gas monitor"
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let outcome = self.poll_cycle().await;
            if outcome.needs_cooldown() {
                debug!(
                    cooldown_secs = self.settings.cooldown.as_secs(),
                    "Alert sent, cooling down"
                );
                time::sleep(self.settings.cooldown).await;
                ticker.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gas_alerts::AlertError;
    use gas_core::{GasOracleResult, GasQuote, GasThreshold, OracleResult};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Layer counting events logged at error level.
    #[derive(Clone, Default)]
    struct ErrorCounter(Arc<Mutex<usize>>);

    impl ErrorCounter {
        fn count(&self) -> usize {
            *self.0.lock().unwrap()
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                *self.0.lock().unwrap() += 1;
            }
        }
    }

    /// Poll once with a scoped subscriber and return the outcome and error count.
    async fn poll_counting_errors(monitor: &GasMonitor) -> (CycleOutcome, usize) {
        let errors = ErrorCounter::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(errors.clone()));
        let outcome = monitor.poll_cycle().await;
        (outcome, errors.count())
    }

    /// Oracle returning the same reply every poll and recording poll times.
    struct StubOracle {
        reply: Result<(String, String), String>,
        polls: Mutex<Vec<Instant>>,
    }

    impl StubOracle {
        fn quote(status: &str, safe: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok((status.to_string(), safe.to_string())),
                polls: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(reason.to_string()),
                polls: Mutex::new(Vec::new()),
            })
        }

        fn poll_times(&self) -> Vec<Instant> {
            self.polls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GasOracle for StubOracle {
        async fn fetch_quote(&self) -> Result<GasQuote, FeedError> {
            self.polls.lock().unwrap().push(Instant::now());
            match &self.reply {
                Ok((status, safe)) => Ok(GasQuote {
                    status: status.clone(),
                    message: "OK".to_string(),
                    result: OracleResult::Prices(GasOracleResult {
                        safe_gas_price: safe.clone(),
                        ..Default::default()
                    }),
                }),
                Err(reason) => Err(FeedError::ConnectionFailed(reason.clone())),
            }
        }
    }

    /// Notifier recording every alert subject.
    struct RecordingNotifier {
        fail: bool,
        sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail,
                sent: Mutex::new(Vec::new()),
            })
        }

        fn subjects(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_alert(&self, alert: &GasAlert) -> Result<(), AlertError> {
            self.sent.lock().unwrap().push(alert.subject());
            if self.fail {
                Err(AlertError::Rejected {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn monitor(oracle: Arc<StubOracle>, notifier: Arc<RecordingNotifier>) -> GasMonitor {
        let threshold: GasThreshold = "30.0".parse().unwrap();
        GasMonitor::new(oracle, notifier, MonitorSettings::new(threshold))
    }

    fn gaps(times: &[Instant]) -> Vec<Duration> {
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn test_needs_cooldown() {
        assert!(CycleOutcome::Alerted { gas: 1.0 }.needs_cooldown());
        assert!(!CycleOutcome::AlertFailed { gas: 1.0 }.needs_cooldown());
        assert!(!CycleOutcome::Idle { gas: 1.0 }.needs_cooldown());
        assert!(!CycleOutcome::Failed.needs_cooldown());
    }

    #[tokio::test]
    async fn test_gas_below_threshold_sends_alert() {
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(StubOracle::quote("1", "25.5"), notifier.clone());

        assert_eq!(
            poll_counting_errors(&monitor).await,
            (CycleOutcome::Alerted { gas: 25.5 }, 0)
        );
        assert_eq!(notifier.subjects(), vec!["Gas is now 25.5".to_string()]);
    }

    #[tokio::test]
    async fn test_gas_equal_to_threshold_sends_alert() {
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(StubOracle::quote("1", "30"), notifier.clone());

        assert_eq!(monitor.poll_cycle().await, CycleOutcome::Alerted { gas: 30.0 });
        assert_eq!(notifier.subjects(), vec!["Gas is now 30.0".to_string()]);
    }

    #[tokio::test]
    async fn test_gas_above_threshold_is_idle() {
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(StubOracle::quote("1", "45.0"), notifier.clone());

        assert_eq!(monitor.poll_cycle().await, CycleOutcome::Idle { gas: 45.0 });
        assert!(notifier.subjects().is_empty());
    }

    #[tokio::test]
    async fn test_bad_status_does_not_alert() {
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(StubOracle::quote("0", "1.0"), notifier.clone());

        assert_eq!(poll_counting_errors(&monitor).await, (CycleOutcome::Failed, 1));
        assert!(notifier.subjects().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_price_does_not_alert() {
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(StubOracle::quote("1", "abc"), notifier.clone());

        assert_eq!(poll_counting_errors(&monitor).await, (CycleOutcome::Failed, 1));
        assert!(notifier.subjects().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let notifier = RecordingNotifier::new(true);
        let monitor = monitor(StubOracle::quote("1", "12.0"), notifier.clone());

        assert_eq!(
            poll_counting_errors(&monitor).await,
            (CycleOutcome::AlertFailed { gas: 12.0 }, 1)
        );
        assert_eq!(notifier.subjects().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_waits_one_interval() {
        let oracle = StubOracle::quote("1", "45.0");
        let monitor = monitor(oracle.clone(), RecordingNotifier::new(false));
        let start = Instant::now();

        let _ = time::timeout(Duration::from_secs(25), monitor.run()).await;

        let polls = oracle.poll_times();
        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0] - start, Duration::from_secs(10));
        assert_eq!(gaps(&polls), vec![Duration::from_secs(10)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_after_successful_alert() {
        let oracle = StubOracle::quote("1", "25.5");
        let notifier = RecordingNotifier::new(false);
        let monitor = monitor(oracle.clone(), notifier.clone());

        let _ = time::timeout(Duration::from_secs(700), monitor.run()).await;

        // 10s, then 5 min cooldown plus one interval between polls.
        let polls = oracle.poll_times();
        assert_eq!(polls.len(), 3);
        assert_eq!(
            gaps(&polls),
            vec![Duration::from_secs(310), Duration::from_secs(310)]
        );
        assert_eq!(notifier.subjects().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_cooldown_after_failed_alert() {
        let oracle = StubOracle::quote("1", "25.5");
        let notifier = RecordingNotifier::new(true);
        let monitor = monitor(oracle.clone(), notifier.clone());

        let _ = time::timeout(Duration::from_secs(55), monitor.run()).await;

        let polls = oracle.poll_times();
        assert_eq!(polls.len(), 5);
        assert!(gaps(&polls).iter().all(|gap| *gap == Duration::from_secs(10)));
        assert_eq!(notifier.subjects().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_errors() {
        for oracle in [
            StubOracle::failing("connection refused"),
            StubOracle::quote("0", "10"),
            StubOracle::quote("1", "abc"),
        ] {
            let notifier = RecordingNotifier::new(false);
            let monitor = monitor(oracle.clone(), notifier.clone());

            let _ = time::timeout(Duration::from_secs(35), monitor.run()).await;

            assert_eq!(oracle.poll_times().len(), 3);
            assert!(notifier.subjects().is_empty());
        }
    }
}
