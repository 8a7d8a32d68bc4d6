//! Vault user profile

use crate::constants::USER_PROFILE_KEY;
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Available,
    Busy,
    Away,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub status: String,
    pub status_kind: StatusKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    fn new_default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: "Me".to_string(),
            phone_number: None,
            status: "Available".to_string(),
            status_kind: StatusKind::Available,
            created_at: now,
            updated_at: now,
        }
    }
}

pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The persisted profile, writing a default one on first access.
    ///
    /// A read failure or corrupt record falls back to a fresh default with
    /// a warning.
    pub fn load(&self) -> UserProfile {
        match self.store.get(USER_PROFILE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(profile) => profile,
                Err(e) => {
                    log::warn!("Stored profile is unreadable, using default: {e}");
                    UserProfile::new_default()
                }
            },
            Ok(None) => {
                let profile = UserProfile::new_default();
                if let Err(e) = self.save(&profile) {
                    log::warn!("Failed to persist default profile: {e:#}");
                }
                profile
            }
            Err(e) => {
                log::warn!("Failed to read profile, using default: {e:#}");
                UserProfile::new_default()
            }
        }
    }

    /// Persist the profile, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let record = UserProfile {
            updated_at: Utc::now(),
            ..profile.clone()
        };
        let raw = serde_json::to_string(&record).context("Failed to serialize profile")?;
        self.store
            .set(USER_PROFILE_KEY, &raw)
            .context("Failed to write profile")
    }

    /// Update the presence status and persist.
    pub fn update_status(&self, status: &str, kind: StatusKind) -> Result<UserProfile> {
        let mut profile = self.load();
        profile.status = status.to_string();
        profile.status_kind = kind;
        self.save(&profile)?;
        Ok(profile)
    }

    /// Remove the persisted profile; the next load recreates a default.
    pub fn clear(&self) -> Result<()> {
        self.store
            .remove(USER_PROFILE_KEY)
            .context("Failed to remove profile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn profile_store() -> (Arc<MemoryStore>, ProfileStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), ProfileStore::new(store))
    }

    #[test]
    fn test_first_access_writes_default() {
        let (store, profiles) = profile_store();

        let profile = profiles.load();
        assert_eq!(profile.status_kind, StatusKind::Available);
        assert!(
            store.get(USER_PROFILE_KEY).unwrap().is_some(),
            "Default profile should be persisted"
        );
    }

    #[test]
    fn test_load_returns_same_profile() {
        let (_store, profiles) = profile_store();

        let first = profiles.load();
        let second = profiles.load();
        assert_eq!(first.id, second.id, "First-access default must persist");
    }

    #[test]
    fn test_update_status_roundtrip() {
        let (_store, profiles) = profile_store();
        profiles.load();

        let updated = profiles
            .update_status("Out for lunch", StatusKind::Away)
            .unwrap();
        assert_eq!(updated.status, "Out for lunch");

        let loaded = profiles.load();
        assert_eq!(loaded.status, "Out for lunch");
        assert_eq!(loaded.status_kind, StatusKind::Away);
    }

    #[test]
    fn test_corrupt_profile_falls_back_to_default() {
        let (store, profiles) = profile_store();
        store.set(USER_PROFILE_KEY, "not json").unwrap();

        let profile = profiles.load();
        assert_eq!(profile.name, "Me");
    }

    #[test]
    fn test_clear_then_load_recreates() {
        let (store, profiles) = profile_store();
        let original = profiles.load();

        profiles.clear().unwrap();
        assert_eq!(store.get(USER_PROFILE_KEY).unwrap(), None);

        let recreated = profiles.load();
        assert_ne!(recreated.id, original.id, "Clear should forget the old id");
    }

    #[test]
    fn test_status_kind_serializes_lowercase() {
        let raw = serde_json::to_string(&StatusKind::Busy).unwrap();
        assert_eq!(raw, "\"busy\"");
    }
}
