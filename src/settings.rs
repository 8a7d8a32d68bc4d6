//! Security settings management
//!
//! This module handles loading and saving the persisted security settings
//! record, which includes the secret code and auto-lock timeout.

use crate::constants::{AUTO_LOCK_DEFAULT_MS, DEFAULT_SECRET_CODE, SETTINGS_KEY};
use crate::storage::KeyValueStore;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Security settings record persisted as JSON under [`SETTINGS_KEY`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VaultSettings {
    /// Code that, followed by `=`, switches the calculator into the vault
    pub secret_code: String,
    /// Optional secondary code reserved for a future panic flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_code: Option<String>,
    /// Inactivity timeout before the vault re-locks, in milliseconds
    pub auto_lock_ms: u64,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            secret_code: DEFAULT_SECRET_CODE.to_string(),
            emergency_code: None,
            auto_lock_ms: AUTO_LOCK_DEFAULT_MS,
        }
    }
}

/// Loads and saves [`VaultSettings`] through the storage capability.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted settings.
    ///
    /// On first access (no record yet) the defaults are written and returned.
    /// A storage read failure or corrupt record falls back to in-memory
    /// defaults with a warning; callers always get usable settings.
    pub fn load(&self) -> VaultSettings {
        match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<VaultSettings>(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Stored settings are unreadable, using defaults: {e}");
                    VaultSettings::default()
                }
            },
            Ok(None) => {
                let defaults = VaultSettings::default();
                if let Err(e) = self.save(&defaults) {
                    log::warn!("Failed to persist default settings: {e:#}");
                }
                defaults
            }
            Err(e) => {
                log::warn!("Failed to read settings, using defaults: {e:#}");
                VaultSettings::default()
            }
        }
    }

    /// Persist the given settings record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails. The
    /// previously persisted record stays authoritative in that case.
    pub fn save(&self, settings: &VaultSettings) -> Result<()> {
        let raw = serde_json::to_string(settings).context("Failed to serialize settings")?;
        self.store
            .set(SETTINGS_KEY, &raw)
            .context("Failed to write settings")?;
        log::info!("Security settings saved");
        Ok(())
    }

    /// Replace the secret code and persist the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the new code is empty or the write fails.
    pub fn update_secret_code(&self, new_code: &str) -> Result<()> {
        if new_code.is_empty() {
            return Err(anyhow!("Secret code must not be empty"));
        }

        let mut settings = self.load();
        settings.secret_code = new_code.to_string();
        self.save(&settings)
    }

    /// Replace the auto-lock timeout and persist the updated record.
    pub fn update_auto_lock_ms(&self, auto_lock_ms: u64) -> Result<()> {
        let mut settings = self.load();
        settings.auto_lock_ms = auto_lock_ms;
        self.save(&settings)
    }

    /// Remove the persisted settings record, restoring defaults on next load.
    pub fn reset_to_defaults(&self) -> Result<()> {
        self.store
            .remove(SETTINGS_KEY)
            .context("Failed to remove settings")?;
        log::info!("Security settings reset to defaults");
        Ok(())
    }
}
