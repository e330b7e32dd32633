//! Fixed-window request rate limiting.
//!
//! Counters live in a [`KvStore`] under `"<key>:<floor(now / window)>"`.
//! This is a fixed-window scheme: burst traffic spanning a window boundary
//! can exceed the nominal limit within a short overlap. That imprecision is
//! accepted; availability is prioritized over strict enforcement, so an
//! unbound or failing store allows the request.

use neosite_platform::{Clock, KvStore};

/// Check and consume one request against a fixed-window counter.
///
/// Returns `true` when the request is allowed. A `None` store, or any store
/// error, fails open. When the window's count has reached `limit` the
/// request is denied without incrementing. Otherwise the count is written
/// back with an expiry of twice the window length to tolerate boundary
/// skew.
pub fn check_rate_limit(
    kv: Option<&dyn KvStore>,
    clock: &dyn Clock,
    key: &str,
    limit: u32,
    window_secs: u64,
) -> bool {
    let Some(kv) = kv else {
        log::warn!("rate limit store unbound; allowing '{key}'");
        return true;
    };
    let window_secs = window_secs.max(1);
    let window = clock.epoch_secs() / window_secs;
    let bucket = format!("{key}:{window}");

    let count: u32 = match kv.get(&bucket) {
        Ok(Some(value)) => value.parse().unwrap_or(0),
        Ok(None) => 0,
        Err(e) => {
            log::warn!("rate limit read failed for '{bucket}': {e}; allowing");
            return true;
        },
    };
    if count >= limit {
        log::debug!("rate limit hit for '{key}' ({count}/{limit})");
        return false;
    }
    if let Err(e) = kv.put(&bucket, &(count + 1).to_string(), window_secs * 2) {
        log::warn!("rate limit write failed for '{bucket}': {e}");
    }
    true
}
