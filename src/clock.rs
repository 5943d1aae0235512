use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock in fractional unix seconds.
///
/// Position records carry this timestamp, so every instance sharing a
/// namespace must use the same epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        // A clock before 1970 reads as 0.0; records then look stale and get dropped.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now() > 1_577_836_800.0);
    }
}
