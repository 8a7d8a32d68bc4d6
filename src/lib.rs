// Library interface for calcvault
// This allows tests and the binary to access the crate's functionality

pub mod calculator;
pub mod codec;
pub mod config;
pub mod constants;
pub mod inactivity;
pub mod mode;
pub mod settings;
pub mod storage;
pub mod vault;

use anyhow::Result;
use calculator::CalculatorScreen;
use inactivity::InactivityMonitor;
use log::info;
use mode::ModeController;
use settings::SettingsStore;
use std::sync::Arc;
use std::time::Duration;
use storage::{FileStore, KeyValueStore};
use vault::contacts::ContactDirectory;
use vault::messages::MessageStore;
use vault::profile::ProfileStore;

/// Core wiring shared between the binary and the tests.
///
/// Opens storage once, loads settings, couples the mode controller to the
/// inactivity monitor (entering UNLOCKED arms the countdown, entering
/// LOCKED disarms it), and hands out the vault services.
pub struct CalcVault {
    settings: SettingsStore,
    mode: ModeController,
    monitor: InactivityMonitor,
    messages: MessageStore,
    contacts: ContactDirectory,
    profile: ProfileStore,
}

impl CalcVault {
    /// Open against the standard data directory.
    ///
    /// `auto_lock_secs_override` takes precedence over the persisted
    /// timeout; the binary resolves CLI and environment sources into it.
    pub fn open_default(auto_lock_secs_override: Option<u64>) -> Result<Self> {
        let store = Arc::new(FileStore::open_default()?);
        Ok(Self::with_store(store, auto_lock_secs_override))
    }

    /// Wire everything against an injected storage backend.
    pub fn with_store(
        store: Arc<dyn KeyValueStore>,
        auto_lock_secs_override: Option<u64>,
    ) -> Self {
        let settings = SettingsStore::new(store.clone());
        let auto_lock_ms = auto_lock_secs_override
            .map(|secs| secs * 1000)
            .unwrap_or_else(|| settings.load().auto_lock_ms);

        let mode = ModeController::new(store.clone());
        let monitor = InactivityMonitor::new(mode.clone(), Duration::from_millis(auto_lock_ms));

        // Countdown lifecycle rides the mode transitions
        let countdown = monitor.clone();
        mode.subscribe(move |active| {
            if active {
                countdown.start();
            } else {
                countdown.stop();
            }
        });

        // A flag restored as UNLOCKED never went through a transition, so
        // arm the countdown by hand
        if mode.is_active() {
            monitor.start();
        }

        info!("Vault core ready (auto-lock {} ms)", auto_lock_ms);

        Self {
            settings,
            mode,
            monitor,
            messages: MessageStore::new(store.clone()),
            contacts: ContactDirectory::new(store.clone()),
            profile: ProfileStore::new(store),
        }
    }

    /// Build a calculator screen.
    ///
    /// The secret code is read here, once; a changed code applies to the
    /// next screen built, never to one already on display.
    pub fn calculator_screen(&self) -> CalculatorScreen {
        let code = self.settings.load().secret_code;
        CalculatorScreen::new(&code, self.mode.clone())
    }

    pub fn is_unlocked(&self) -> bool {
        self.mode.is_active()
    }

    /// Re-lock immediately.
    pub fn lock(&self) -> Result<()> {
        self.mode.deactivate()
    }

    /// Record vault-side activity, pushing the auto-lock deadline back.
    pub fn note_vault_activity(&self) {
        self.monitor.reset_timer();
    }

    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn contacts(&self) -> &ContactDirectory {
        &self.contacts
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }
}
