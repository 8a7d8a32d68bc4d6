//! Inactivity countdown for auto-lock
//!
//! A single background thread polls an armed deadline. Arming, re-arming and
//! disarming all replace the deadline under one mutex, and expiry takes the
//! deadline atomically, so a superseded or stopped countdown can never fire.

use crate::constants::INACTIVITY_CHECK_INTERVAL_MS;
use crate::mode::ModeController;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct MonitorInner {
    deadline: Option<Instant>,
    timeout: Duration,
}

/// Cloneable handle to the auto-lock countdown.
#[derive(Clone)]
pub struct InactivityMonitor {
    inner: Arc<Mutex<MonitorInner>>,
}

impl InactivityMonitor {
    /// Create a monitor that deactivates `mode` when the countdown expires.
    ///
    /// Spawns the polling thread immediately; the countdown stays disarmed
    /// until [`start`](Self::start) is called.
    pub fn new(mode: ModeController, timeout: Duration) -> Self {
        let inner = Arc::new(Mutex::new(MonitorInner {
            deadline: None,
            timeout,
        }));

        let monitor = Self { inner };
        monitor.spawn_worker(mode);
        monitor
    }

    /// Arm the countdown. Replaces any countdown already running.
    pub fn start(&self) {
        let mut inner = self.inner.lock();
        let deadline = Instant::now() + inner.timeout;
        inner.deadline = Some(deadline);
        log::debug!("Inactivity countdown armed for {:?}", inner.timeout);
    }

    /// Disarm the countdown.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.deadline.take().is_some() {
            log::debug!("Inactivity countdown disarmed");
        }
    }

    /// Push the deadline back to a full timeout from now.
    ///
    /// No-op while the monitor is stopped.
    pub fn reset_timer(&self) {
        let mut inner = self.inner.lock();
        if inner.deadline.is_some() {
            inner.deadline = Some(Instant::now() + inner.timeout);
        }
    }

    fn spawn_worker(&self, mode: ModeController) {
        let state = self.inner.clone();
        thread::Builder::new()
            .name("inactivity-monitor".to_string())
            .spawn(move || {
                log::debug!("Inactivity monitoring thread started");

                loop {
                    thread::sleep(Duration::from_millis(INACTIVITY_CHECK_INTERVAL_MS));

                    // Take the deadline atomically so expiry fires at most
                    // once per arming and never for a replaced deadline.
                    let expired = {
                        let mut inner = state.lock();
                        match inner.deadline {
                            Some(deadline) if Instant::now() >= deadline => {
                                inner.deadline = None;
                                true
                            }
                            _ => false,
                        }
                    };

                    if expired {
                        log::info!("Inactivity timeout expired, locking");
                        if let Err(e) = mode.deactivate() {
                            log::warn!("Failed to lock on inactivity timeout: {e:#}");
                            // Still unlocked with no countdown; re-arm so the
                            // lock is retried.
                            let mut inner = state.lock();
                            if inner.deadline.is_none() {
                                inner.deadline = Some(Instant::now() + inner.timeout);
                            }
                        }
                    }
                }
            })
            .expect("Failed to spawn inactivity monitor thread");
    }
}
