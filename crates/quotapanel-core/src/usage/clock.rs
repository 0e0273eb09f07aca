//! Time source used when turning reset timestamps into countdowns.

use parking_lot::Mutex;

/// Supplies the current time as fractional Unix epoch seconds
pub trait Clock: Send + Sync {
    fn now_epoch_secs(&self) -> f64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> f64 {
        chrono::Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Clock that only moves when told to (tests, demos)
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    /// Create a clock frozen at `now` epoch seconds
    pub fn new(now: f64) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, now: f64) {
        *self.now.lock() = now;
    }

    /// Move forward by `secs`
    pub fn advance(&self, secs: f64) {
        *self.now.lock() += secs;
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> f64 {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000.0);
        assert_eq!(clock.now_epoch_secs(), 1_000.0);
        clock.advance(30.5);
        assert_eq!(clock.now_epoch_secs(), 1_030.5);
        clock.set(5.0);
        assert_eq!(clock.now_epoch_secs(), 5.0);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_epoch_secs() > 1_577_836_800.0);
    }
}
