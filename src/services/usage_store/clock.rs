use std::time::{SystemTime, UNIX_EPOCH};

/// Источник времени для меток последнего использования (мс с начала эпохи)
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now_millis(), 10);
        clock.advance(5);
        assert_eq!(clock.now_millis(), 15);
        clock.set(3);
        assert_eq!(clock.now_millis(), 3);
    }
}
