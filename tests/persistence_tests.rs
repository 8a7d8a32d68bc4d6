use calcvault::constants::MESSAGES_KEY;
use calcvault::storage::{FileStore, KeyValueStore, MemoryStore};
use calcvault::vault::profile::StatusKind;
use calcvault::CalcVault;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_store_dir() -> PathBuf {
    // Unique per-test directory so parallel tests never share a path.
    let mut base = std::env::temp_dir();
    base.push("calcvault_tests");
    base.push("integration");

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tid = format!("{:?}", thread::current().id());
    base.push(format!("t_{nanos}_{tid}"));
    base
}

#[test]
fn test_messages_survive_restart_on_disk() {
    let dir = temp_store_dir();
    {
        let store = Arc::new(FileStore::open(&dir).unwrap());
        let vault = CalcVault::with_store(store, None);
        vault.messages().save_message("see you at eight", true).unwrap();
    }

    let store = Arc::new(FileStore::open(&dir).unwrap());
    let vault = CalcVault::with_store(store, None);
    let messages = vault.messages().messages();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "see you at eight");
    assert!(messages[0].is_own);

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_message_plaintext_never_touches_disk() {
    let dir = temp_store_dir();
    let store = Arc::new(FileStore::open(&dir).unwrap());
    let vault = CalcVault::with_store(store, None);

    vault
        .messages()
        .save_message("rendezvous at the pier", true)
        .unwrap();

    let raw = fs::read_to_string(dir.join(format!("{MESSAGES_KEY}.json"))).unwrap();
    assert!(
        !raw.contains("rendezvous"),
        "Plaintext must not appear in the storage file: {raw}"
    );

    fs::remove_dir_all(dir).ok();
}

#[test]
fn test_message_ordering_and_wipe() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);

    vault.messages().save_message("first", true).unwrap();
    vault.messages().save_message("second", false).unwrap();
    vault.messages().save_message("third", true).unwrap();

    let texts: Vec<String> = vault
        .messages()
        .messages()
        .into_iter()
        .map(|m| m.text)
        .collect();
    assert_eq!(texts, ["first", "second", "third"]);

    vault.messages().clear_all().unwrap();
    assert!(vault.messages().messages().is_empty());
}

#[test]
fn test_conversation_state_feeds_contact_overview() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let contacts = vault.contacts();

    let earlier = Utc.timestamp_opt(1_000, 0).single().unwrap();
    let later = Utc.timestamp_opt(2_000, 0).single().unwrap();
    contacts.record_message("4", "lunch?", earlier).unwrap();
    contacts.record_message("7", "running late", later).unwrap();

    let overview = contacts.overview();
    assert_eq!(overview[0].contact.id, "7", "Most recent first");
    assert_eq!(overview[1].contact.id, "4");
    assert_eq!(overview[0].unread_count, 1);

    contacts.mark_read("7").unwrap();
    let overview = contacts.overview();
    assert_eq!(overview[0].unread_count, 0);
    assert_eq!(
        overview[0].last_message.as_deref(),
        Some("running late"),
        "Reading keeps the preview"
    );
}

#[test]
fn test_contact_search_through_facade() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);

    let by_name = vault.contacts().search("emma");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].contact.name, "Emma Leroy");

    let by_phone = vault.contacts().search("56 78 90 12");
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].contact.name, "Julie Moreau");
}

#[test]
fn test_profile_updates_persist_across_instances() {
    let store = Arc::new(MemoryStore::new());
    {
        let vault = CalcVault::with_store(store.clone(), None);
        vault
            .profile()
            .update_status("Do not disturb", StatusKind::Busy)
            .unwrap();
    }

    let vault = CalcVault::with_store(store, None);
    let profile = vault.profile().load();
    assert_eq!(profile.status, "Do not disturb");
    assert_eq!(profile.status_kind, StatusKind::Busy);
}

#[test]
fn test_settings_persist_across_instances() {
    let store = Arc::new(MemoryStore::new());
    {
        let vault = CalcVault::with_store(store.clone(), None);
        vault.settings().update_secret_code("8080").unwrap();
        vault.settings().update_auto_lock_ms(45_000).unwrap();
    }

    let vault = CalcVault::with_store(store, None);
    let settings = vault.settings().load();
    assert_eq!(settings.secret_code, "8080");
    assert_eq!(settings.auto_lock_ms, 45_000);
}

#[test]
fn test_corrupt_storage_degrades_without_errors() {
    let store = Arc::new(MemoryStore::new());
    store.set(MESSAGES_KEY, "not json").unwrap();

    let vault = CalcVault::with_store(store, None);
    assert!(vault.messages().messages().is_empty());
    assert!(!vault.is_unlocked());
}

#[test]
fn test_each_key_lives_in_its_own_file() {
    let dir = temp_store_dir();
    let store = Arc::new(FileStore::open(&dir).unwrap());
    let vault = CalcVault::with_store(store, None);

    vault.messages().save_message("hi", true).unwrap();
    vault.settings().update_secret_code("2222").unwrap();

    assert!(dir.join("encrypted_messages.json").exists());
    assert!(dir.join("app_settings.json").exists());

    fs::remove_dir_all(dir).ok();
}
