//! Persisted message list
//!
//! Message text is run through the codec before it reaches storage and
//! decoded on the way out. Records are kept as a single JSON array under
//! one storage key.

use crate::codec;
use crate::constants::MESSAGES_KEY;
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub is_own: bool,
}

pub struct MessageStore {
    store: Arc<dyn KeyValueStore>,
}

impl MessageStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Append a message, encoding its text at rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn save_message(&self, text: &str, is_own: bool) -> Result<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            text: text.to_string(),
            timestamp: Utc::now(),
            is_own,
        };

        let mut records = self.load_records();
        records.push(Message {
            text: codec::encode(text),
            ..message.clone()
        });

        let raw = serde_json::to_string(&records).context("Failed to serialize messages")?;
        self.store
            .set(MESSAGES_KEY, &raw)
            .context("Failed to write messages")?;

        Ok(message)
    }

    /// All messages in insertion order, text decoded.
    ///
    /// A record whose text no longer decodes is returned with the raw
    /// stored token; a list that no longer parses is returned empty. Both
    /// cases log and never error.
    pub fn messages(&self) -> Vec<Message> {
        self.load_records()
            .into_iter()
            .map(|record| Message {
                text: codec::decode(&record.text),
                ..record
            })
            .collect()
    }

    /// Remove every persisted message.
    pub fn clear_all(&self) -> Result<()> {
        self.store
            .remove(MESSAGES_KEY)
            .context("Failed to clear messages")?;
        log::info!("All messages cleared");
        Ok(())
    }

    fn load_records(&self) -> Vec<Message> {
        match self.store.get(MESSAGES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Stored message list is unreadable, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read messages, starting empty: {e:#}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn message_store() -> (Arc<MemoryStore>, MessageStore) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), MessageStore::new(store))
    }

    #[test]
    fn test_empty_store_returns_no_messages() {
        let (_store, messages) = message_store();
        assert!(messages.messages().is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_store, messages) = message_store();

        messages.save_message("first", true).unwrap();
        messages.save_message("second", false).unwrap();

        let loaded = messages.messages();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "first");
        assert!(loaded[0].is_own);
        assert_eq!(loaded[1].text, "second");
        assert!(!loaded[1].is_own);
    }

    #[test]
    fn test_text_is_encoded_at_rest() {
        let (store, messages) = message_store();

        messages.save_message("rendezvous at nine", true).unwrap();

        let raw = store.get(MESSAGES_KEY).unwrap().unwrap();
        assert!(
            !raw.contains("rendezvous"),
            "Plaintext must not appear in storage: {raw}"
        );
    }

    #[test]
    fn test_undecodable_record_degrades_to_raw_token() {
        let (store, messages) = message_store();
        messages.save_message("good", true).unwrap();

        // Corrupt the stored text of the first record
        let mut records: Vec<Message> =
            serde_json::from_str(&store.get(MESSAGES_KEY).unwrap().unwrap()).unwrap();
        records[0].text = "!!not-base64!!".to_string();
        store
            .set(MESSAGES_KEY, &serde_json::to_string(&records).unwrap())
            .unwrap();

        let loaded = messages.messages();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "!!not-base64!!");
    }

    #[test]
    fn test_corrupt_list_returns_empty() {
        let (store, messages) = message_store();
        store.set(MESSAGES_KEY, "not json").unwrap();

        assert!(messages.messages().is_empty());
    }

    #[test]
    fn test_clear_all_removes_record() {
        let (store, messages) = message_store();
        messages.save_message("gone soon", true).unwrap();

        messages.clear_all().unwrap();

        assert_eq!(store.get(MESSAGES_KEY).unwrap(), None);
        assert!(messages.messages().is_empty());
    }

    #[test]
    fn test_timestamps_are_iso8601() {
        let (store, messages) = message_store();
        messages.save_message("when", true).unwrap();

        let raw = store.get(MESSAGES_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let stamp = parsed[0]["timestamp"].as_str().unwrap();
        assert!(
            DateTime::parse_from_rfc3339(stamp).is_ok(),
            "Timestamp should be ISO-8601: {stamp}"
        );
    }
}
