use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation {op} did not complete within {limit:?}")]
pub struct BoundedTimeout {
    pub op: &'static str,
    pub limit: Duration,
}

/// Race an operation against a deadline and take whichever finishes first.
///
/// The loser is dropped, which cancels it. Used for the startup steps that
/// must never hold the process hostage (database authentication, table
/// creation).
pub async fn bounded<F>(limit: Duration, op: &'static str, fut: F) -> Result<F::Output, BoundedTimeout>
where
    F: Future,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| BoundedTimeout { op, limit })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_when_operation_is_fast() {
        let out = bounded(Duration::from_secs(1), "fast", async { 42 }).await;
        assert_eq!(out, Ok(42));
    }

    #[tokio::test]
    async fn times_out_when_operation_never_resolves() {
        let out = bounded(
            Duration::from_millis(10),
            "stuck",
            std::future::pending::<()>(),
        )
        .await;
        let err = out.unwrap_err();
        assert_eq!(err.op, "stuck");
        assert_eq!(err.limit, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn inner_errors_pass_through_untouched() {
        let out = bounded(Duration::from_secs(1), "failing", async {
            Err::<(), &str>("boom")
        })
        .await;
        assert_eq!(out, Ok(Err("boom")));
    }
}
