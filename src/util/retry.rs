//! Fixed one-shot retry: attempt, wait, attempt once more, give up.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Both attempts of a [`retry_once`] failed.
#[derive(Debug, Clone)]
pub struct RetryExhausted<E> {
    pub first: E,
    pub last: E,
}

enum Attempt<E> {
    First,
    Retry { first: E },
}

/// Run `operation`; if it fails, sleep `delay` and run it exactly once more.
///
/// The first failure is logged and held back; it only reaches the caller
/// (alongside the second) when the retry fails too.
pub async fn retry_once<F, Fut, T, E>(
    delay: Duration,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut state = Attempt::First;
    loop {
        let result = operation().await;
        state = match (state, result) {
            (_, Ok(value)) => return Ok(value),
            (Attempt::First, Err(err)) => {
                tracing::warn!(
                    error = %err,
                    retry_in_ms = millis(delay),
                    "Attempt failed, retrying once"
                );
                tokio::time::sleep(delay).await;
                Attempt::Retry { first: err }
            }
            (Attempt::Retry { first }, Err(last)) => {
                return Err(RetryExhausted { first, last });
            }
        };
    }
}

fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
