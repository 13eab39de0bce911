use crate::alert::alarm::Alarm;
use crate::alert::notifier::Notifier;
use std::sync::Arc;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fans an alert out to the notifier and the audible alarm without blocking
/// the tick loop. Delivery failures are logged, never surfaced: by the time
/// dispatch happens the state machine has already counted the alert as fired.
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    alarm: Arc<dyn Alarm>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, alarm: Arc<dyn Alarm>) -> Self {
        Self {
            notifier,
            alarm,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// Fire-and-forget: spawns the delivery task and returns immediately.
    pub fn dispatch(&self, message: String, location: String) {
        let notifier = Arc::clone(&self.notifier);
        let alarm = Arc::clone(&self.alarm);
        let max_attempts = self.max_attempts;
        let retry_delay = self.retry_delay;
        tokio::spawn(async move {
            deliver(notifier, max_attempts, retry_delay, &message, &location).await;
            if let Err(e) = alarm.sound().await {
                tracing::error!("Alarm playback failed: {}", e);
            }
        });
    }
}

async fn deliver(
    notifier: Arc<dyn Notifier>,
    max_attempts: u32,
    retry_delay: Duration,
    message: &str,
    location: &str,
) {
    for attempt in 1..=max_attempts {
        match notifier.notify(message, location).await {
            Ok(()) => {
                tracing::info!("Alert sent via {}.", notifier.name());
                return;
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    "Alert delivery attempt {}/{} failed: {}; retrying",
                    attempt,
                    max_attempts,
                    e
                );
                tokio::time::sleep(retry_delay).await;
            }
            Err(e) => {
                tracing::error!(
                    "Alert delivery failed after {} attempts: {}",
                    max_attempts,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyNotifier {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn notify(&self, _message: &str, _location: &str) -> Result<(), NotifyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                return Err(NotifyError::Rejected(503));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "FlakyNotifier"
        }
    }

    #[tokio::test]
    async fn retries_until_delivery_succeeds() {
        let notifier = Arc::new(FlakyNotifier {
            calls: AtomicU32::new(0),
            failures_before_success: 2,
        });
        deliver(notifier.clone(), 3, Duration::ZERO, "msg", "loc").await;
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_budget() {
        let notifier = Arc::new(FlakyNotifier {
            calls: AtomicU32::new(0),
            failures_before_success: u32::MAX,
        });
        deliver(notifier.clone(), 3, Duration::ZERO, "msg", "loc").await;
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }
}
