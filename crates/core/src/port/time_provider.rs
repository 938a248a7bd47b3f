// Time Provider Port (for testability)

use chrono::{DateTime, FixedOffset, Utc};

/// Time provider interface (allows mocking in tests)
///
/// Instants are always UTC; calendar computations (month boundaries,
/// wedding-day midnights) use the provider's fixed timezone.
pub trait TimeProvider: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Fixed timezone of the contest
    fn timezone(&self) -> FixedOffset;
}

/// System time provider (production)
pub struct SystemTimeProvider {
    timezone: FixedOffset,
}

impl SystemTimeProvider {
    pub fn new(timezone: FixedOffset) -> Self {
        Self { timezone }
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> FixedOffset {
        self.timezone
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Manually driven clock for tests
    pub struct ManualTimeProvider {
        now: Mutex<DateTime<Utc>>,
        timezone: FixedOffset,
    }

    impl ManualTimeProvider {
        pub fn new(now: DateTime<Utc>, timezone: FixedOffset) -> Self {
            Self {
                now: Mutex::new(now),
                timezone,
            }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.lock().unwrap() = now;
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl TimeProvider for ManualTimeProvider {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }

        fn timezone(&self) -> FixedOffset {
            self.timezone
        }
    }
}
