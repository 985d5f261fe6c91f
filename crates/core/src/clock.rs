// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction.
//!
//! Monotonic waiting (sleeps, deadlines) is handled directly with
//! `tokio::time` throughout the engine crate, exercised in tests with
//! paused/advanced tokio time. This trait exists only for the one place
//! wall-clock *values* leak into the system's output: backup tag and
//! business-key generation, both of which embed a local timestamp.

use chrono::{DateTime, Local};

/// Supplies the current local wall-clock time.
pub trait Clock: Clone + Send + Sync + 'static {
    fn local_now(&self) -> DateTime<Local>;
}

/// Production clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct FakeClock {
    now: std::sync::Arc<std::sync::Mutex<DateTime<Local>>>,
}

impl FakeClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: std::sync::Arc::new(std::sync::Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        #[allow(clippy::unwrap_used)]
        {
            *self.now.lock().unwrap() = now;
        }
    }
}

impl Clock for FakeClock {
    fn local_now(&self) -> DateTime<Local> {
        #[allow(clippy::unwrap_used)]
        {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
