use std::time::Duration;

use chrono::DateTime;
use chrono::TimeZone;
use chrono::Utc;
use rand::Rng;

use crate::constants::SOMPI_PER_KAS;

pub fn sompi_to_kas(sompi: u64) -> f64 {
    sompi as f64 / SOMPI_PER_KAS as f64
}

/// Block time in epoch milliseconds to a UTC instant.
pub fn block_time_to_utc(block_time_ms: Option<i64>) -> Option<DateTime<Utc>> {
    block_time_ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Exponential backoff: `unit_ms * base^attempt`, capped at `max_delay_ms`,
/// with an optional ±`jitter_ratio` spread.
pub fn calculate_backoff_with_jitter(
    attempt: u32,
    base: u64,
    unit_ms: u64,
    max_delay_ms: u64,
    jitter_ratio: f64,
) -> Duration {
    let exponential_delay = unit_ms.saturating_mul(base.saturating_pow(attempt));

    // Cap at max delay
    let capped_delay = exponential_delay.min(max_delay_ms);

    let jitter_range = (capped_delay as f64 * jitter_ratio.clamp(0.0, 1.0)) as u64;
    if jitter_range == 0 {
        return Duration::from_millis(capped_delay);
    }

    let mut rng = rand::rng();
    let jitter = rng.random_range(0..=jitter_range * 2);
    let final_delay = capped_delay.saturating_add(jitter).saturating_sub(jitter_range);

    Duration::from_millis(final_delay)
}

/// Evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(
    start: f64,
    end: f64,
    steps: usize,
) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (steps - 1) as f64;
            (0..steps).map(|i| if i == steps - 1 { end } else { start + step * i as f64 }).collect()
        },
    }
}
