//! Wait-for-condition polling
//!
//! Replaces fixed sleeps before assertions: a probe is re-run at a fixed
//! interval until it yields a value or the deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::common::{Error, Result};

/// Poll `probe` until it returns `Some`, or fail with [`Error::Timeout`]
///
/// The probe runs at least once even with a zero timeout. Probe errors end
/// the wait immediately.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::timeout(what, timeout.as_millis() as u64));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

/// Poll a counter until it holds still for `quiet`
///
/// Used to approximate network idle: the number of loaded resources stops
/// growing.
pub async fn wait_until_stable<F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    quiet: Duration,
    mut sample: F,
) -> Result<u64>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    let deadline = Instant::now() + timeout;
    let mut last = sample().await?;
    let mut since = Instant::now();
    loop {
        let now = Instant::now();
        if now.duration_since(since) >= quiet {
            return Ok(last);
        }
        if now >= deadline {
            return Err(Error::timeout(what, timeout.as_millis() as u64));
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
        let current = sample().await?;
        if current != last {
            last = current;
            since = Instant::now();
        }
    }
}
