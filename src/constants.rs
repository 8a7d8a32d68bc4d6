//! Centralized constants for calcvault
//!
//! This module contains all configurable numerical values used throughout
//! the application. Each constant includes documentation on its purpose,
//! unit, and recommended value range.

// ============================================================================
// SECRET CODE CONFIGURATION
// ============================================================================

/// Secret code used when no configuration exists yet.
/// Activation requires the code immediately followed by `=`.
pub const DEFAULT_SECRET_CODE: &str = "12345";

// ============================================================================
// AUTO-LOCK CONFIGURATION
// ============================================================================

/// Minimum auto-lock timeout allowed for overrides.
/// Unit: seconds
/// Range: Fixed minimum, do not change without updating CLI validation
pub const AUTO_LOCK_MIN_SECONDS: u64 = 20;

/// Maximum auto-lock timeout allowed for overrides.
/// Unit: seconds
/// Range: Fixed maximum (10 minutes), do not change without updating CLI validation
pub const AUTO_LOCK_MAX_SECONDS: u64 = 600;

/// Default auto-lock timeout when no config exists.
/// Unit: milliseconds
/// Recommended range: 60_000-300_000 (1-5 minutes)
pub const AUTO_LOCK_DEFAULT_MS: u64 = 120_000;

// ============================================================================
// ROLLING SEQUENCE BUFFER
// ============================================================================

/// Buffer length at which truncation kicks in.
/// Unit: characters
/// Range: must stay >= BUFFER_KEEP_CHARS
pub const BUFFER_MAX_CHARS: usize = 20;

/// Characters retained (from the end) after truncation.
/// Unit: characters
/// Range: must stay large enough to hold any configured code plus `=`
pub const BUFFER_KEEP_CHARS: usize = 10;

// ============================================================================
// POLLING & THREAD INTERVALS
// ============================================================================

/// Inactivity countdown check interval.
/// Unit: milliseconds
/// Recommended range: 100-1000 (lower = more responsive, higher = less CPU)
pub const INACTIVITY_CHECK_INTERVAL_MS: u64 = 250;

// ============================================================================
// STORAGE KEYS
// ============================================================================

/// Key under which the security settings record is persisted.
pub const SETTINGS_KEY: &str = "app_settings";

/// Key under which the secret-mode flag is persisted (stringified bool).
pub const SECRET_MODE_KEY: &str = "secret_mode_active";

/// Key under which the obfuscated message list is persisted.
pub const MESSAGES_KEY: &str = "encrypted_messages";

/// Key under which the contact roster is persisted.
pub const CONTACTS_KEY: &str = "app_contacts";

/// Key under which conversation metadata is persisted.
pub const CONVERSATIONS_KEY: &str = "app_conversations";

/// Key under which the user profile record is persisted.
pub const USER_PROFILE_KEY: &str = "user_profile";

// ============================================================================
// FILE PERMISSIONS
// ============================================================================

/// Storage file permissions (user read/write only for security).
/// Unit: Unix permission bits (octal)
/// Recommended: 0o600 (secure) or 0o644 (readable by others)
pub const STORAGE_FILE_PERMISSIONS: u32 = 0o600;
