//! Request-scoped storage deadline

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Error, Result};

/// Default budget for one request's storage work
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(3);

/// Absolute expiry shared by every storage call of one request.
///
/// Expiry drops the in-flight future. An open [`UnitOfWork`](super::UnitOfWork)
/// dropped this way rolls back.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            budget,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Run `op`, failing with [`Error::Timeout`] once the deadline passes.
    pub async fn run<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout_at(self.expires_at, op)
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(self.budget)))
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::after(DEFAULT_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test(start_paused = true)]
    async fn expired_deadline_is_transient() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let result: Result<()> = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(50)));
        assert_eq!(err.kind(), ErrorKind::Transient);
    }

    #[tokio::test(start_paused = true)]
    async fn passes_through_inner_result() {
        let deadline = Deadline::after(Duration::from_secs(1));
        assert_eq!(deadline.run(async { Ok(7) }).await.unwrap(), 7);

        let err = deadline
            .run(async { Err::<(), _>(Error::not_found("page", "x")) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_shrinks() {
        let deadline = Deadline::after(Duration::from_secs(2));
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(deadline.remaining(), Duration::from_millis(1500));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
