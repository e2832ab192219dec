//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` is 1-based; attempt 0 yields no delay. `jitter` is the maximum
/// extra delay as a fraction of the capped delay (0.1 = up to 10%).
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter: f64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = (capped_delay as f64 * jitter.clamp(0.0, 1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000, 0.1);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000, 0.1);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000, 0.1);
        assert!(max.as_millis() >= 1000 && max.as_millis() < 1100);
    }

    #[test]
    fn test_no_jitter_is_exact() {
        assert_eq!(calculate_backoff(0, 100, 2000, 0.0), Duration::ZERO);
        assert_eq!(calculate_backoff(1, 100, 2000, 0.0), Duration::from_millis(100));
        assert_eq!(calculate_backoff(3, 100, 2000, 0.0), Duration::from_millis(400));
        assert_eq!(calculate_backoff(64, 100, 2000, 0.0), Duration::from_millis(2000));
    }
}
