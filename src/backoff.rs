//! Exponential backoff with symmetric ±25% jitter.

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

/// Fraction of the base delay added or removed by jitter.
const JITTER_RATIO: f64 = 0.25;

static JITTER_DEGRADED: AtomicBool = AtomicBool::new(false);

/// Whether any backoff in this process has drawn its jitter from the wall
/// clock because the OS random source failed. Sticky once set.
///
/// The matching `warn` event is only emitted with the `tracing` feature; this
/// flag is set either way.
pub fn jitter_degraded() -> bool {
    JITTER_DEGRADED.load(Ordering::Relaxed)
}

/// Un-jittered delay before retry `attempt` (1 = first retry).
///
/// `retry_wait_min * 2^(attempt - 1)`, capped at `retry_wait_max`.
pub(crate) fn base_delay(
    attempt: usize,
    retry_wait_min: Duration,
    retry_wait_max: Duration,
) -> Duration {
    if retry_wait_min.is_zero() {
        return Duration::ZERO;
    }
    let exp = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    2u32.checked_pow(exp)
        .and_then(|factor| retry_wait_min.checked_mul(factor))
        .map_or(retry_wait_max, |base| base.min(retry_wait_max))
}

/// Spreads `base` uniformly over `[0.75 * base, 1.25 * base)` using
/// `fraction` in `[0, 1)`.
pub(crate) fn apply_jitter(base: Duration, fraction: f64) -> Duration {
    let factor = 1.0 - JITTER_RATIO + fraction * JITTER_RATIO * 2.0;
    Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(base)
}

/// Jittered delay before retry `attempt`.
pub(crate) fn calculate_backoff(
    attempt: usize,
    retry_wait_min: Duration,
    retry_wait_max: Duration,
) -> Duration {
    apply_jitter(
        base_delay(attempt, retry_wait_min, retry_wait_max),
        secure_random_fraction(),
    )
}

/// Uniform draw in `[0, 1)` from the operating system CSPRNG.
///
/// Falls back to sub-second wall clock entropy if the OS source fails, and
/// records that in [`jitter_degraded`].
pub(crate) fn secure_random_fraction() -> f64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => fraction_from_bytes(buf),
        Err(err) => degraded_fraction(err),
    }
}

fn degraded_fraction(_err: getrandom::Error) -> f64 {
    JITTER_DEGRADED.store(true, Ordering::Relaxed);
    #[cfg(feature = "tracing")]
    tracing::warn!(
        error = %_err,
        "OS random source unavailable, jitter degraded to wall clock"
    );
    clock_fraction()
}

fn fraction_from_bytes(buf: [u8; 8]) -> f64 {
    // 53 bits fill an f64 mantissa exactly, so the result stays below 1.0.
    (u64::from_be_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64
}

fn clock_fraction() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos())
        .unwrap_or_default();
    f64::from(nanos % 1_000) / 1_000.0
}
