//! Environment variable overrides
//!
//! The primary configuration source is the persisted settings record (see
//! the settings module). Environment variables can optionally override it
//! at startup:
//! - CALCVAULT_AUTO_LOCK: Override auto-lock timeout in seconds

use crate::constants::{AUTO_LOCK_MAX_SECONDS, AUTO_LOCK_MIN_SECONDS};
use log::{debug, info, warn};
use std::env;

/// Parse the CALCVAULT_AUTO_LOCK environment variable
///
/// Returns Some(seconds) if a valid timeout is configured (20-600 seconds)
/// Returns None if not set or invalid
pub fn parse_auto_lock_timeout() -> Option<u64> {
    match env::var("CALCVAULT_AUTO_LOCK") {
        Ok(val) => match val.parse::<u64>() {
            Ok(seconds) if (AUTO_LOCK_MIN_SECONDS..=AUTO_LOCK_MAX_SECONDS).contains(&seconds) => {
                info!(
                    "Auto-lock timeout set via environment variable: {} seconds",
                    seconds
                );
                Some(seconds)
            }
            Ok(seconds) => {
                warn!(
                    "Invalid auto-lock timeout: {} (must be {}-{} seconds). Using configured value.",
                    seconds, AUTO_LOCK_MIN_SECONDS, AUTO_LOCK_MAX_SECONDS
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to parse CALCVAULT_AUTO_LOCK: {}. Using configured value.",
                    e
                );
                None
            }
        },
        Err(_) => {
            debug!("CALCVAULT_AUTO_LOCK not set.");
            None
        }
    }
}
