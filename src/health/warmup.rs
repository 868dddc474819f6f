//! Upstream warm-up probing.
//!
//! A cold knowledge-base backend tends to fail its first request. After the
//! first failed attempt the retry observer pings the liveness path so the
//! retried call has a better chance. The probe never influences the outcome
//! of the retry sequence.

use futures_util::future::{BoxFuture, FutureExt};
use std::time::Duration;

use crate::observability::metrics;
use crate::upstream::{KbClient, UpstreamError};

/// Ping the liveness path once and ignore the result.
pub async fn warm_up(client: &KbClient) {
    match client.ping().await {
        Ok(()) => tracing::debug!(base_url = %client.base_url(), "Warm-up probe succeeded"),
        Err(e) => tracing::debug!(base_url = %client.base_url(), error = %e, "Warm-up probe failed"),
    }
}

/// Retry observer used by the proxy handlers.
///
/// Logs every retry and awaits a warm-up probe after the first failure only.
pub fn retry_observer(
    client: &KbClient,
    endpoint: &'static str,
) -> impl FnMut(u32, &UpstreamError, Duration) -> BoxFuture<'static, ()> + Send {
    let client = client.clone();
    move |attempt: u32, error: &UpstreamError, delay: Duration| {
        tracing::warn!(
            endpoint,
            attempt,
            delay = ?delay,
            error = %error,
            "Upstream call failed, retrying"
        );
        metrics::record_retry(endpoint);

        if attempt == 1 {
            let client = client.clone();
            async move { warm_up(&client).await }.boxed()
        } else {
            futures_util::future::ready(()).boxed()
        }
    }
}
