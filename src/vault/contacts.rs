//! Contact roster and conversation metadata
//!
//! Contacts come from a seeded demo roster (persisted on first access);
//! conversations track per-contact last message and unread count. The two
//! are merged into one overview list sorted by most recent activity.

use crate::constants::{CONTACTS_KEY, CONVERSATIONS_KEY};
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub is_online: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub contact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

/// A contact merged with its conversation state, as shown in the vault list.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactOverview {
    pub contact: Contact,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: u32,
}

pub struct ContactDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl ContactDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The contact roster, seeding the demo roster on first access.
    pub fn contacts(&self) -> Vec<Contact> {
        match self.store.get(CONTACTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(contacts) => contacts,
                Err(e) => {
                    log::warn!("Stored roster is unreadable, using demo roster: {e}");
                    demo_roster()
                }
            },
            Ok(None) => {
                let roster = demo_roster();
                if let Err(e) = self.persist_roster(&roster) {
                    log::warn!("Failed to persist demo roster: {e:#}");
                }
                roster
            }
            Err(e) => {
                log::warn!("Failed to read roster, using demo roster: {e:#}");
                demo_roster()
            }
        }
    }

    /// Roster merged with conversation state, most recent activity first,
    /// idle contacts after, ordered by name.
    pub fn overview(&self) -> Vec<ContactOverview> {
        let conversations = self.conversations();
        let mut entries: Vec<ContactOverview> = self
            .contacts()
            .into_iter()
            .map(|contact| {
                let conversation = conversations
                    .iter()
                    .find(|conv| conv.contact_id == contact.id);
                ContactOverview {
                    last_message: conversation.and_then(|c| c.last_message.clone()),
                    last_message_time: conversation.and_then(|c| c.last_message_time),
                    unread_count: conversation.map(|c| c.unread_count).unwrap_or(0),
                    contact,
                }
            })
            .collect();

        entries.sort_by(|a, b| match (a.last_message_time, b.last_message_time) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.contact.name.cmp(&b.contact.name),
        });
        entries
    }

    /// Record a new last message for a contact, bumping its unread count.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the conversation list fails.
    pub fn record_message(
        &self,
        contact_id: &str,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut conversations = self.conversations();

        match conversations
            .iter_mut()
            .find(|conv| conv.contact_id == contact_id)
        {
            Some(conversation) => {
                conversation.last_message = Some(message.to_string());
                conversation.last_message_time = Some(timestamp);
                conversation.unread_count += 1;
            }
            None => conversations.push(Conversation {
                contact_id: contact_id.to_string(),
                last_message: Some(message.to_string()),
                last_message_time: Some(timestamp),
                unread_count: 1,
            }),
        }

        self.persist_conversations(&conversations)
    }

    /// Reset a contact's unread count to zero.
    pub fn mark_read(&self, contact_id: &str) -> Result<()> {
        let mut conversations = self.conversations();
        for conversation in &mut conversations {
            if conversation.contact_id == contact_id {
                conversation.unread_count = 0;
            }
        }
        self.persist_conversations(&conversations)
    }

    /// Substring search over names (case-insensitive) and phone numbers.
    pub fn search(&self, query: &str) -> Vec<ContactOverview> {
        let query = query.trim();
        let entries = self.overview();
        if query.is_empty() {
            return entries;
        }

        let needle = query.to_lowercase();
        entries
            .into_iter()
            .filter(|entry| {
                entry.contact.name.to_lowercase().contains(&needle)
                    || entry.contact.phone_number.contains(query)
            })
            .collect()
    }

    fn conversations(&self) -> Vec<Conversation> {
        match self.store.get(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(conversations) => conversations,
                Err(e) => {
                    log::warn!("Stored conversations are unreadable, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read conversations, starting empty: {e:#}");
                Vec::new()
            }
        }
    }

    fn persist_roster(&self, roster: &[Contact]) -> Result<()> {
        let raw = serde_json::to_string(roster).context("Failed to serialize roster")?;
        self.store
            .set(CONTACTS_KEY, &raw)
            .context("Failed to write roster")
    }

    fn persist_conversations(&self, conversations: &[Conversation]) -> Result<()> {
        let raw =
            serde_json::to_string(conversations).context("Failed to serialize conversations")?;
        self.store
            .set(CONVERSATIONS_KEY, &raw)
            .context("Failed to write conversations")
    }
}

fn demo_roster() -> Vec<Contact> {
    let seed = [
        ("1", "Sarah Martin", "+33 6 12 34 56 78", true),
        ("2", "Thomas Dubois", "+33 6 23 45 67 89", false),
        ("3", "Emma Leroy", "+33 6 34 56 78 90", true),
        ("4", "Lucas Bernard", "+33 6 45 67 89 01", false),
        ("5", "Julie Moreau", "+33 6 56 78 90 12", true),
        ("6", "Antoine Rousseau", "+33 6 67 89 01 23", false),
        ("7", "Camille Petit", "+33 6 78 90 12 34", true),
        ("8", "Maxime Durand", "+33 6 89 01 23 45", false),
    ];

    seed.into_iter()
        .map(|(id, name, phone_number, is_online)| Contact {
            id: id.to_string(),
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            is_online,
        })
        .collect()
}
