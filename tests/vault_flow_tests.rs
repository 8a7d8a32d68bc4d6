use calcvault::calculator::keys::Key;
use calcvault::calculator::CalculatorScreen;
use calcvault::constants::SECRET_MODE_KEY;
use calcvault::storage::{KeyValueStore, MemoryStore};
use calcvault::CalcVault;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn press_all(screen: &mut CalculatorScreen, tokens: &str) {
    for ch in tokens.chars() {
        let key = Key::from_char(ch).expect("unknown key token");
        screen.press(key).expect("keypress failed");
    }
}

#[test]
fn test_starts_locked() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    assert!(!vault.is_unlocked());
}

#[test]
fn test_default_code_opens_vault() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345=");
    assert!(vault.is_unlocked());
    assert_eq!(screen.display(), "0", "Display must not betray the entry");
}

#[test]
fn test_split_code_is_ordinary_arithmetic() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12+345=");
    assert!(!vault.is_unlocked());
    assert_eq!(screen.display(), "357");
}

#[test]
fn test_code_after_long_session_still_opens() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let mut screen = vault.calculator_screen();

    // Enough junk to push the keystroke buffer past its cap
    press_all(&mut screen, "9876543210987654321098765=");
    assert!(!vault.is_unlocked());

    press_all(&mut screen, "12345=");
    assert!(vault.is_unlocked());
}

#[test]
fn test_clear_wipes_pending_code() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345C=");
    assert!(!vault.is_unlocked());
}

#[test]
fn test_unlock_state_survives_restart() {
    let store = Arc::new(MemoryStore::new());
    {
        let vault = CalcVault::with_store(store.clone(), None);
        let mut screen = vault.calculator_screen();
        press_all(&mut screen, "12345=");
        assert!(vault.is_unlocked());
    }

    let vault = CalcVault::with_store(store, None);
    assert!(vault.is_unlocked(), "Persisted flag should be restored");
}

#[test]
fn test_changed_code_takes_effect_on_next_screen() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    vault.settings().update_secret_code("4711").unwrap();

    let mut screen = vault.calculator_screen();
    press_all(&mut screen, "12345=");
    assert!(!vault.is_unlocked(), "Old code must be dead");

    press_all(&mut screen, "4711=");
    assert!(vault.is_unlocked());
}

#[test]
fn test_failed_persist_keeps_vault_locked() {
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("write failed"))
        }
        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("remove failed"))
        }
    }

    let vault = CalcVault::with_store(Arc::new(ReadOnlyStore), None);
    let mut screen = vault.calculator_screen();

    for ch in "12345".chars() {
        screen.press(Key::from_char(ch).unwrap()).unwrap();
    }
    let result = screen.press(Key::Equals);

    assert!(result.is_err(), "Unpersistable unlock should surface");
    assert!(!vault.is_unlocked(), "Store stays authoritative");
}

#[test]
fn test_auto_lock_after_inactivity() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), Some(1));
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345=");
    assert!(vault.is_unlocked());

    thread::sleep(Duration::from_millis(1600));
    assert!(!vault.is_unlocked(), "Vault should auto-lock after timeout");
}

#[test]
fn test_activity_defers_auto_lock() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), Some(1));
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345=");

    thread::sleep(Duration::from_millis(600));
    vault.note_vault_activity();

    thread::sleep(Duration::from_millis(700));
    assert!(vault.is_unlocked(), "Activity should push the deadline back");

    thread::sleep(Duration::from_millis(900));
    assert!(!vault.is_unlocked(), "Idle again, so the lock lands");
}

#[test]
fn test_restored_unlock_still_auto_locks() {
    let store = Arc::new(MemoryStore::new());
    store.set(SECRET_MODE_KEY, "true").unwrap();

    let vault = CalcVault::with_store(store, Some(1));
    assert!(vault.is_unlocked());

    thread::sleep(Duration::from_millis(1600));
    assert!(
        !vault.is_unlocked(),
        "A restored unlock must arm the countdown too"
    );
}

#[test]
fn test_manual_lock_then_reopen() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), None);
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345=");
    vault.lock().unwrap();
    assert!(!vault.is_unlocked());

    press_all(&mut screen, "12345=");
    assert!(vault.is_unlocked(), "Relocking must not burn the code");
}

#[test]
fn test_unlock_after_expiry_rearms_countdown() {
    let vault = CalcVault::with_store(Arc::new(MemoryStore::new()), Some(1));
    let mut screen = vault.calculator_screen();

    press_all(&mut screen, "12345=");
    thread::sleep(Duration::from_millis(1600));
    assert!(!vault.is_unlocked());

    press_all(&mut screen, "12345=");
    assert!(vault.is_unlocked());

    thread::sleep(Duration::from_millis(1600));
    assert!(!vault.is_unlocked(), "Second session should expire as well");
}
