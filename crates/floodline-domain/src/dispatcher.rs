use std::sync::Arc;

use tracing::{debug, instrument};

use crate::correlation::CorrelationKey;
use crate::engine::WorkflowEngine;
use crate::error::DomainResult;
use crate::retry::{RetryPolicy, Sleeper};
use crate::signal::Signal;

/// Terminal result of a dispatch attempt sequence.
///
/// `NotFound` and `NotReady` are expected outcomes (the caller logs and
/// acknowledges); engine transport failures are returned as errors instead
/// so the broker redelivers the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    NotFound { attempts: u32 },
    NotReady { attempts: u32 },
}

/// Delivers workflow signals keyed by correlation, absorbing read-after-write
/// lag between process creation and signal arrival with a bounded
/// fixed-backoff retry.
///
/// Every attempt is an independent engine interaction:
/// 1. Look up the process instance by correlation key.
/// 2. Check that the instance is waiting on the signal.
/// 3. Deliver the signal.
///
/// No lock or transaction is held across the backoff sleep.
pub struct SignalDispatcher {
    engine: Arc<dyn WorkflowEngine>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

enum Miss {
    NotFound,
    NotReady,
}

impl SignalDispatcher {
    pub fn new(engine: Arc<dyn WorkflowEngine>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            engine,
            policy,
            sleeper,
        }
    }

    #[instrument(skip(self, key, signal), fields(correlation_key = %key, signal_name = %signal.name))]
    pub async fn dispatch(
        &self,
        key: &CorrelationKey,
        signal: &Signal,
    ) -> DomainResult<DispatchOutcome> {
        let mut last_miss = Miss::NotFound;

        for attempt in 1..=self.policy.max_attempts {
            match self.engine.find_by_correlation_key(key).await? {
                None => {
                    debug!(attempt, "no process instance for correlation key");
                    last_miss = Miss::NotFound;
                }
                Some(instance) => {
                    let pending = self.engine.pending_signals(key).await?;
                    if pending.iter().any(|name| name == &signal.name) {
                        self.engine.signal(instance, signal).await?;
                        debug!(attempt, "signal delivered");
                        return Ok(DispatchOutcome::Delivered);
                    }
                    debug!(attempt, "process instance not awaiting signal");
                    last_miss = Miss::NotReady;
                }
            }

            if attempt < self.policy.max_attempts {
                self.sleeper.sleep(self.policy.delay).await;
            }
        }

        let attempts = self.policy.max_attempts;
        Ok(match last_miss {
            Miss::NotFound => DispatchOutcome::NotFound { attempts },
            Miss::NotReady => DispatchOutcome::NotReady { attempts },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockWorkflowEngine, ProcessInstanceHandle};
    use crate::error::DomainError;
    use crate::retry::MockSleeper;
    use crate::signal::SIGNAL_MISSION_STARTED;
    use std::time::Duration;

    fn test_policy() -> RetryPolicy {
        RetryPolicy::new(5, Duration::from_millis(300))
    }

    #[tokio::test]
    async fn test_dispatch_delivers_on_first_attempt() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mock_sleeper = MockSleeper::new();

        mock_engine
            .expect_find_by_correlation_key()
            .withf(|key: &CorrelationKey| key.as_str() == "incident-1")
            .times(1)
            .returning(|_| Ok(Some(ProcessInstanceHandle(42))));
        mock_engine
            .expect_pending_signals()
            .times(1)
            .returning(|_| Ok(vec![SIGNAL_MISSION_STARTED.to_string()]));
        mock_engine
            .expect_signal()
            .withf(|instance, signal| {
                *instance == ProcessInstanceHandle(42)
                    && signal.name == SIGNAL_MISSION_STARTED
                    && signal.value.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-1").unwrap();

        // Act
        let outcome = dispatcher
            .dispatch(&key, &Signal::named(SIGNAL_MISSION_STARTED))
            .await
            .unwrap();

        // Assert - no sleeps on a first-attempt delivery
        assert_eq!(outcome, DispatchOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_dispatch_exhausts_attempts_when_instance_never_appears() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mut mock_sleeper = MockSleeper::new();

        mock_engine
            .expect_find_by_correlation_key()
            .times(5)
            .returning(|_| Ok(None));
        // One fewer sleep than attempts
        mock_sleeper
            .expect_sleep()
            .withf(|duration| *duration == Duration::from_millis(300))
            .times(4)
            .returning(|_| ());

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-2").unwrap();

        // Act
        let outcome = dispatcher
            .dispatch(&key, &Signal::named(SIGNAL_MISSION_STARTED))
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome, DispatchOutcome::NotFound { attempts: 5 });
    }

    #[tokio::test]
    async fn test_dispatch_delivers_once_instance_appears() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mut mock_sleeper = MockSleeper::new();
        let mut seq = mockall::Sequence::new();

        mock_engine
            .expect_find_by_correlation_key()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        mock_engine
            .expect_find_by_correlation_key()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(ProcessInstanceHandle(7))));
        mock_engine
            .expect_pending_signals()
            .times(1)
            .returning(|_| Ok(vec![SIGNAL_MISSION_STARTED.to_string()]));
        mock_engine
            .expect_signal()
            .times(1)
            .returning(|_, _| Ok(()));
        mock_sleeper.expect_sleep().times(2).returning(|_| ());

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-3").unwrap();

        // Act
        let outcome = dispatcher
            .dispatch(&key, &Signal::named(SIGNAL_MISSION_STARTED))
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome, DispatchOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_dispatch_reports_not_ready_when_signal_not_awaited() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mut mock_sleeper = MockSleeper::new();

        mock_engine
            .expect_find_by_correlation_key()
            .times(5)
            .returning(|_| Ok(Some(ProcessInstanceHandle(42))));
        mock_engine
            .expect_pending_signals()
            .times(5)
            .returning(|_| Ok(vec!["VictimDelivered".to_string()]));
        mock_sleeper.expect_sleep().times(4).returning(|_| ());

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-4").unwrap();

        // Act
        let outcome = dispatcher
            .dispatch(&key, &Signal::named(SIGNAL_MISSION_STARTED))
            .await
            .unwrap();

        // Assert - the instance exists but never awaited the signal
        assert_eq!(outcome, DispatchOutcome::NotReady { attempts: 5 });
    }

    #[tokio::test]
    async fn test_dispatch_propagates_engine_errors_without_retrying() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mock_sleeper = MockSleeper::new();

        mock_engine
            .expect_find_by_correlation_key()
            .times(1)
            .returning(|_| Err(DomainError::EngineError(anyhow::anyhow!("engine unreachable"))));

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-5").unwrap();

        // Act
        let result = dispatcher
            .dispatch(&key, &Signal::named(SIGNAL_MISSION_STARTED))
            .await;

        // Assert - transport failures surface to the caller for redelivery
        assert!(matches!(result, Err(DomainError::EngineError(_))));
    }

    #[tokio::test]
    async fn test_dispatch_passes_signal_value_through() {
        // Arrange
        let mut mock_engine = MockWorkflowEngine::new();
        let mock_sleeper = MockSleeper::new();

        mock_engine
            .expect_find_by_correlation_key()
            .times(1)
            .returning(|_| Ok(Some(ProcessInstanceHandle(9))));
        mock_engine
            .expect_pending_signals()
            .times(1)
            .returning(|_| Ok(vec!["ResponderAvailable".to_string()]));
        mock_engine
            .expect_signal()
            .withf(|_, signal| signal.value == Some(serde_json::Value::Bool(true)))
            .times(1)
            .returning(|_, _| Ok(()));

        let dispatcher = SignalDispatcher::new(
            Arc::new(mock_engine),
            test_policy(),
            Arc::new(mock_sleeper),
        );
        let key = CorrelationKey::new("incident-6").unwrap();

        // Act
        let outcome = dispatcher
            .dispatch(
                &key,
                &Signal::with_value("ResponderAvailable", serde_json::Value::Bool(true)),
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(outcome, DispatchOutcome::Delivered);
    }
}
