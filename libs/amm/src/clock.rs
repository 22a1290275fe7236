//! Time source for deadline checks

use crate::error::{AmmError, AmmResult};
use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies the current Unix time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;

    /// Fail with [`AmmError::Expired`] once `now` has passed `deadline`
    fn ensure_not_expired(&self, deadline: u64) -> AmmResult<()> {
        let now = self.now();
        if now > deadline {
            return Err(AmmError::Expired { deadline, now });
        }
        Ok(())
    }
}

/// Wall clock backed by `chrono::Utc`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // Pre-epoch system time reads as 0
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
