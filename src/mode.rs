//! Secret mode state machine
//!
//! Two states, LOCKED and UNLOCKED. The persisted flag is the source of
//! truth; the in-memory boolean is a cache of it. Transitions persist first,
//! then update the cache, then notify subscribers, so observers never see a
//! state the store does not already hold.

use crate::constants::SECRET_MODE_KEY;
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::sync::Arc;

type Subscriber = Arc<dyn Fn(bool) + Send + Sync>;

struct ModeInner {
    active: bool,
    subscribers: Vec<Subscriber>,
}

/// Cloneable handle to the mode state shared across modules.
#[derive(Clone)]
pub struct ModeController {
    store: Arc<dyn KeyValueStore>,
    inner: Arc<Mutex<ModeInner>>,
}

impl ModeController {
    /// Create a controller, restoring the persisted flag.
    ///
    /// Missing or unreadable stored state means LOCKED.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let active = match store.get(SECRET_MODE_KEY) {
            Ok(Some(raw)) => raw == "true",
            Ok(None) => false,
            Err(e) => {
                log::warn!("Failed to read secret mode flag, starting locked: {e:#}");
                false
            }
        };

        if active {
            log::info!("Restored secret mode: unlocked");
        }

        Self {
            store,
            inner: Arc::new(Mutex::new(ModeInner {
                active,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock().active
    }

    /// Enter UNLOCKED. No-op (no persist, no notification) if already there.
    pub fn activate(&self) -> Result<()> {
        self.transition(true)
    }

    /// Enter LOCKED. No-op (no persist, no notification) if already there.
    pub fn deactivate(&self) -> Result<()> {
        self.transition(false)
    }

    /// Register a callback invoked synchronously with the new state on every
    /// real transition.
    pub fn subscribe(&self, callback: impl Fn(bool) + Send + Sync + 'static) {
        self.inner.lock().subscribers.push(Arc::new(callback));
    }

    fn transition(&self, target: bool) -> Result<()> {
        // Subscribers are invoked after the guard is released so a callback
        // may call back into the controller.
        let subscribers: Vec<Subscriber> = {
            let mut inner = self.inner.lock();
            if inner.active == target {
                return Ok(());
            }

            // Persist before touching the cache; a failed write leaves the
            // in-memory state unchanged.
            self.store
                .set(SECRET_MODE_KEY, if target { "true" } else { "false" })
                .context("Failed to persist secret mode flag")?;

            inner.active = target;
            log::info!(
                "Secret mode {}",
                if target { "activated" } else { "deactivated" }
            );

            inner.subscribers.clone()
        };

        for subscriber in subscribers {
            subscriber(target);
        }
        Ok(())
    }
}
