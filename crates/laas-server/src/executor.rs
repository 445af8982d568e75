// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bounded execution of engine computations.

use std::time::Duration;

use laas_engine::{Deadline, EngineError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, ServiceError};

/// Runs engine calls on the blocking pool under the synchronous timeout.
///
/// The call receives a [`Deadline`] that fires when the timeout passes.
/// Cancellation is cooperative: the engine polls the deadline and unwinds
/// with [`EngineError::Aborted`]. The timeout answer does not wait for the
/// worker: it is detached and drains in the background. Whatever the call
/// returns after the timer won is discarded and reported as
/// [`ServiceError::Timeout`].
#[derive(Debug, Clone, Copy)]
pub struct BoundedExecutor {
    timeout: Duration,
}

impl BoundedExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `computation` and classify its outcome.
    pub async fn run<T, F>(&self, computation: F) -> Result<T>
    where
        F: FnOnce(&Deadline) -> laas_engine::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let token = CancellationToken::new();
        let deadline = Deadline::new(token.clone(), self.timeout);
        let expiry = deadline.clone();
        let mut task = tokio::task::spawn_blocking(move || computation(&deadline));

        tokio::select! {
            biased;

            _ = tokio::time::sleep(self.timeout) => {
                token.cancel();
                tokio::spawn(async move {
                    if let Err(e) = task.await {
                        debug!(error = %e, "Aborted computation did not finish cleanly");
                    }
                });
                Err(ServiceError::Timeout)
            }

            joined = &mut task => match joined {
                // finished, but only after the deadline passed
                Ok(_) if expiry.is_aborted() => Err(ServiceError::Timeout),
                Ok(Ok(value)) => Ok(value),
                Ok(Err(EngineError::Aborted)) => Err(ServiceError::Timeout),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => Err(ServiceError::internal(format!("computation task failed: {e}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completed_value() {
        let executor = BoundedExecutor::new(Duration::from_secs(5));
        assert_eq!(executor.run(|_| Ok(42)).await, Ok(42));
    }

    #[tokio::test]
    async fn test_domain_error_is_illegal_input() {
        let executor = BoundedExecutor::new(Duration::from_secs(5));
        let outcome = executor
            .run(|_| {
                Err::<(), _>(EngineError::rejected(
                    "input for subsumption must be in CNF or DNF",
                ))
            })
            .await;
        assert_eq!(
            outcome,
            Err(ServiceError::IllegalInput(
                "input for subsumption must be in CNF or DNF".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_deadline_aborts_cooperative_loop() {
        let executor = BoundedExecutor::new(Duration::from_millis(20));
        let outcome = executor
            .run(|deadline| -> laas_engine::Result<()> {
                loop {
                    deadline.check()?;
                    std::thread::sleep(Duration::from_millis(1));
                }
            })
            .await;
        assert_eq!(outcome, Err(ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_zero_timeout_always_times_out() {
        let executor = BoundedExecutor::new(Duration::ZERO);
        assert_eq!(executor.run(|_| Ok(1)).await, Err(ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_late_value_is_discarded() {
        let executor = BoundedExecutor::new(Duration::from_millis(10));
        let outcome = executor
            .run(|_| {
                std::thread::sleep(Duration::from_millis(50));
                Ok("too late")
            })
            .await;
        assert_eq!(outcome, Err(ServiceError::Timeout));
    }

    #[tokio::test]
    async fn test_timeout_answers_before_worker_finishes() {
        let executor = BoundedExecutor::new(Duration::from_millis(20));
        let started = std::time::Instant::now();
        let outcome = executor
            .run(|_| {
                std::thread::sleep(Duration::from_millis(1000));
                Ok(())
            })
            .await;
        assert_eq!(outcome, Err(ServiceError::Timeout));
        assert!(started.elapsed() < Duration::from_millis(500), "{:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_panic_is_internal() {
        let executor = BoundedExecutor::new(Duration::from_secs(5));
        let outcome: Result<()> = executor.run(|_| panic!("boom")).await;
        assert!(matches!(outcome, Err(ServiceError::Internal { .. })));
    }
}
