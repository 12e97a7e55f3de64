//! Timeout and cancellation wrappers applied to every external call.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::StageError;

/// Run `fut` under `limit`. An elapsed timer is [`StageError::Timeout`].
pub(crate) async fn timed<T, E, F>(call: &'static str, limit: Duration, fut: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, E>>,
    StageError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(StageError::from),
        Err(_) => Err(StageError::Timeout { call, limit }),
    }
}

/// Like [`timed`], but refuses to start once `token` is cancelled and
/// abandons the call if cancellation arrives while it is in flight.
pub(crate) async fn guarded<T, E, F>(
    call: &'static str,
    limit: Duration,
    token: &CancellationToken,
    fut: F,
) -> Result<T, StageError>
where
    F: Future<Output = Result<T, E>>,
    StageError: From<E>,
{
    if token.is_cancelled() {
        return Err(StageError::Cancelled);
    }
    tokio::select! {
        biased;
        () = token.cancelled() => Err(StageError::Cancelled),
        result = timed(call, limit, fut) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;

    #[tokio::test(start_paused = true)]
    async fn timed_reports_elapsed_limit() {
        let result: Result<(), StageError> = timed(
            "stalled",
            Duration::from_secs(5),
            std::future::pending::<Result<(), PersistenceError>>(),
        )
        .await;
        assert!(matches!(result, Err(StageError::Timeout { call: "stalled", .. })));
    }

    #[tokio::test]
    async fn timed_passes_through_inner_error() {
        let result: Result<(), StageError> = timed("fails", Duration::from_secs(5), async {
            Err(PersistenceError::Other("boom".to_owned()))
        })
        .await;
        assert!(matches!(result, Err(StageError::Persistence(_))));
    }

    #[tokio::test]
    async fn guarded_refuses_after_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let result = guarded("any", Duration::from_secs(5), &token, async {
            Ok::<u32, PersistenceError>(1)
        })
        .await;
        assert!(matches!(result, Err(StageError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn guarded_abandons_in_flight_call_on_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });
        let result = guarded(
            "slow",
            Duration::from_secs(600),
            &token,
            std::future::pending::<Result<(), PersistenceError>>(),
        )
        .await;
        assert!(matches!(result, Err(StageError::Cancelled)));
    }
}
