use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

/// Time source for the scheduler. Monotonic time drives timers, wall time stamps records.
pub trait Clock: Send {
    fn now(&self) -> Instant;
    fn wall_now(&self) -> DateTime<Utc>;
}

/// Reads tokio's clock, so paused-time runtimes drive it too.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct ManualTime {
    instant: Instant,
    wall: DateTime<Utc>,
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    time: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
    pub fn new(wall: DateTime<Utc>) -> Self {
        Self {
            time: Arc::new(Mutex::new(ManualTime {
                instant: Instant::now(),
                wall,
            })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = match self.time.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.instant += by;
        guard.wall += chrono::Duration::from_std(by).unwrap_or(chrono::Duration::zero());
    }

    /// Fractional-second form of [`advance`](Self::advance). Negative or
    /// non-finite amounts are rejected and leave the clock untouched.
    pub fn advance_secs(&self, seconds: f64) -> Result<()> {
        let by = Duration::try_from_secs_f64(seconds)
            .map_err(|err| anyhow!("cannot advance clock by {seconds}s: {err}"))?;
        self.advance(by);
        Ok(())
    }

    fn read(&self) -> ManualTime {
        match self.time.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.read().instant
    }

    fn wall_now(&self) -> DateTime<Utc> {
        self.read().wall
    }
}
