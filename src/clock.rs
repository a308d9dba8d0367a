//! Millisecond clock.
//!
//! [`TickClock`] is a shared atomic counter advanced by a [`Ticker`] thread
//! once per millisecond. Reading it is a single atomic load, so the game
//! loop never sees a half-updated value.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::status::StatusLatch;

pub trait Clock {
    /// Milliseconds since the clock started.
    fn now(&self) -> u64;
}

#[derive(Clone, Debug, Default)]
pub struct TickClock {
    ticks: Arc<AtomicU64>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::AcqRel);
    }
}

impl Clock for TickClock {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Release);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}

// ── Background tick ───────────────────────────────────────────────────────────

/// Background thread standing in for the 1 ms timer interrupt: advances the
/// clock and multiplexes the status display. Stops when dropped.
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(clock: TickClock, status: Arc<StatusLatch>) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || {
                let start = Instant::now();
                let mut issued: u64 = 0;
                while !stop_flag.load(Ordering::Acquire) {
                    // Catch up on any ticks missed while descheduled.
                    let due = start.elapsed().as_millis() as u64;
                    while issued < due {
                        clock.tick();
                        status.refresh();
                        issued += 1;
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            })?;
        log::debug!("ticker thread started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("ticker thread panicked");
            }
        }
    }
}
