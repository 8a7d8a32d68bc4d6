// CalcVault CLI - Terminal interface for the calculator-disguised vault
// This binary provides the calculator prompt and, once unlocked, the vault shell

use anyhow::{Context, Result};
use calcvault::calculator::keys::Key;
use calcvault::constants::{
    AUTO_LOCK_DEFAULT_MS, AUTO_LOCK_MAX_SECONDS, AUTO_LOCK_MIN_SECONDS, DEFAULT_SECRET_CODE,
};
use calcvault::settings::SettingsStore;
use calcvault::storage::FileStore;
use calcvault::vault::profile::StatusKind;
use calcvault::{config, CalcVault};
use clap::Parser;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Calculator on the surface, private vault underneath
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Calculator on the surface, private vault underneath",
    long_about = "A fully working calculator that doubles as a private vault.

To anyone watching, this is a calculator. Type your secret code followed
by '=' to open the vault: encrypted messages, a contact list, and your
profile. The vault re-locks automatically after a period of inactivity.

SETUP:
  Before using CalcVault, run the setup command to configure your code:
    calcvault --setup

  This will prompt you for:
    - Secret code (digits work best, they blend into calculations)
    - Auto-lock timeout (default: 120 seconds)

  Settings are stored in your local data directory.

USAGE:
  Type calculator keys (0-9 . + - * / % = C) and press Enter.
  Typing <code>= opens the vault; 'help' inside lists vault commands.
  The default code is 12345 until you run setup."
)]
struct Args {
    /// Start locked even if the vault was left open last session
    #[arg(short, long)]
    fresh: bool,

    /// Auto-lock timeout in seconds of vault inactivity (20-600, overrides saved settings)
    /// NOTE: Keep range values in sync with AUTO_LOCK_* constants
    #[arg(long)]
    auto_lock: Option<u64>,

    /// Run interactive setup to configure the secret code and timeout
    #[arg(long)]
    setup: bool,
}

/// Helper function to prompt for a line of input
fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Helper function to prompt for a number with a default value
fn prompt_number(prompt: &str, default: u64) -> Result<u64> {
    let input = prompt_line(prompt)?;

    if input.is_empty() {
        Ok(default)
    } else {
        input
            .parse::<u64>()
            .with_context(|| format!("Invalid number: {}", input))
    }
}

/// Run interactive setup to configure the secret code and auto-lock timeout
fn run_setup() -> Result<()> {
    println!("CalcVault Setup");
    println!("===============\n");

    let code = prompt_line("Enter secret code: ").context("Failed to read secret code")?;

    if code.is_empty() {
        anyhow::bail!("Error: Secret code cannot be empty");
    }

    let confirm = prompt_line("Confirm secret code: ").context("Failed to read confirmation")?;

    if code != confirm {
        anyhow::bail!("Error: Secret codes do not match");
    }

    let default_secs = AUTO_LOCK_DEFAULT_MS / 1000;
    let auto_lock = prompt_number(
        &format!("Auto-lock timeout in seconds (default: {}): ", default_secs),
        default_secs,
    )?;

    if !(AUTO_LOCK_MIN_SECONDS..=AUTO_LOCK_MAX_SECONDS).contains(&auto_lock) {
        anyhow::bail!(
            "Error: Auto-lock timeout must be {}-{} seconds",
            AUTO_LOCK_MIN_SECONDS,
            AUTO_LOCK_MAX_SECONDS
        );
    }

    let store = Arc::new(FileStore::open_default().context("Failed to open storage")?);
    let settings = SettingsStore::new(store);
    settings
        .update_secret_code(&code)
        .context("Failed to save secret code")?;
    settings
        .update_auto_lock_ms(auto_lock * 1000)
        .context("Failed to save auto-lock timeout")?;

    println!("\nSetup complete!");
    println!("\nYou can now run 'calcvault' and type {}= to open the vault.", code);

    Ok(())
}

fn print_vault_help() {
    println!("Vault commands:");
    println!("  messages            show stored messages");
    println!("  send <text>         store a new message");
    println!("  contacts            list contacts with conversation state");
    println!("  search <query>      search contacts by name or phone");
    println!("  read <contact-id>   mark a conversation as read");
    println!("  profile             show your profile");
    println!("  status <text>       update your presence status");
    println!("  code <new-code>     change the secret code (next screen)");
    println!("  wipe                delete all stored messages");
    println!("  lock                re-lock the vault now");
    println!("  help                this list");
    println!("Anything else returns to the calculator.");
}

/// One vault command. Returns false when the shell should exit back to the
/// calculator.
fn run_vault_command(vault: &CalcVault, line: &str) -> Result<bool> {
    vault.note_vault_activity();

    let (command, rest) = match line.split_once(' ') {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match command {
        "messages" => {
            let messages = vault.messages().messages();
            if messages.is_empty() {
                println!("(no messages)");
            }
            for message in messages {
                let who = if message.is_own { "me" } else { "them" };
                println!("[{}] {}: {}", message.timestamp.to_rfc3339(), who, message.text);
            }
        }
        "send" => {
            if rest.is_empty() {
                println!("Usage: send <text>");
            } else {
                let message = vault.messages().save_message(rest, true)?;
                println!("Stored message {}", message.id);
            }
        }
        "contacts" => {
            for entry in vault.contacts().overview() {
                let presence = if entry.contact.is_online { "online" } else { "offline" };
                let last = entry.last_message.as_deref().unwrap_or("-");
                println!(
                    "{:>2}  {:<18} {:<18} {:<8} unread:{:<3} {}",
                    entry.contact.id,
                    entry.contact.name,
                    entry.contact.phone_number,
                    presence,
                    entry.unread_count,
                    last
                );
            }
        }
        "search" => {
            for entry in vault.contacts().search(rest) {
                println!("{:>2}  {:<18} {}", entry.contact.id, entry.contact.name, entry.contact.phone_number);
            }
        }
        "read" => {
            if rest.is_empty() {
                println!("Usage: read <contact-id>");
            } else {
                vault.contacts().mark_read(rest)?;
                println!("Marked conversation {} as read", rest);
            }
        }
        "profile" => {
            let profile = vault.profile().load();
            println!("Name:   {}", profile.name);
            if let Some(phone) = &profile.phone_number {
                println!("Phone:  {}", phone);
            }
            println!("Status: {}", profile.status);
        }
        "status" => {
            if rest.is_empty() {
                println!("Usage: status <text>");
            } else {
                vault.profile().update_status(rest, StatusKind::Custom)?;
                println!("Status updated");
            }
        }
        "code" => {
            if rest.is_empty() {
                println!("Usage: code <new-code>");
            } else {
                vault.settings().update_secret_code(rest)?;
                println!("Secret code updated (applies to the next calculator screen)");
            }
        }
        "wipe" => {
            vault.messages().clear_all()?;
            println!("All messages deleted");
        }
        "lock" => {
            vault.lock()?;
            return Ok(false);
        }
        "help" => print_vault_help(),
        _ => return Ok(false),
    }

    Ok(true)
}

fn run_vault_shell(vault: &CalcVault) -> Result<()> {
    println!("\n=== VAULT UNLOCKED ===");
    print_vault_help();

    let stdin = io::stdin();
    loop {
        if !vault.is_unlocked() {
            println!("\n(auto-locked after inactivity)");
            return Ok(());
        }

        print!("vault> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            vault.lock()?;
            return Ok(());
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // The vault may have auto-locked while we sat at the prompt
        if !vault.is_unlocked() {
            println!("(auto-locked after inactivity)");
            return Ok(());
        }

        if !run_vault_command(vault, line)? {
            if vault.is_unlocked() {
                vault.lock()?;
            }
            println!("=== VAULT LOCKED ===\n");
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Handle setup command
    if args.setup {
        return run_setup();
    }

    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    info!("Starting CalcVault");

    // Configure auto-lock timeout (precedence: CLI arg > env var > saved settings)
    let auto_lock_override = match args.auto_lock {
        Some(timeout) if (AUTO_LOCK_MIN_SECONDS..=AUTO_LOCK_MAX_SECONDS).contains(&timeout) => {
            info!("Auto-lock timeout set via --auto-lock argument: {} seconds", timeout);
            Some(timeout)
        }
        Some(timeout) => {
            warn!(
                "Invalid --auto-lock value: {} (must be {}-{} seconds). Using environment variable or saved settings.",
                timeout, AUTO_LOCK_MIN_SECONDS, AUTO_LOCK_MAX_SECONDS
            );
            config::parse_auto_lock_timeout()
        }
        None => config::parse_auto_lock_timeout(),
    };

    let vault = CalcVault::open_default(auto_lock_override).context("Failed to open vault")?;

    if args.fresh && vault.is_unlocked() {
        vault.lock().context("Failed to lock vault")?;
        info!("Starting locked (--fresh flag)");
    }

    println!("CalcVault Calculator");
    println!("Keys: 0-9 . + - * / % = C   (type a line of keys, then Enter; 'quit' exits)");
    if vault.settings().load().secret_code == DEFAULT_SECRET_CODE {
        println!("Tip: run 'calcvault --setup' to replace the default code.");
    }

    let mut screen = vault.calculator_screen();
    println!("[ {} ]", screen.display());

    let stdin = io::stdin();
    loop {
        if vault.is_unlocked() {
            run_vault_shell(&vault)?;
            // A new screen picks up any code change made inside the vault
            screen = vault.calculator_screen();
            println!("[ {} ]", screen.display());
            continue;
        }

        print!("calc> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        if line == "quit" || line == "exit" {
            break;
        }

        for ch in line.chars() {
            if ch.is_whitespace() {
                continue;
            }
            match Key::from_char(ch) {
                Some(key) => screen.press(key).context("Keypress failed")?,
                None => println!("(ignored '{}')", ch),
            }
            if vault.is_unlocked() {
                break;
            }
        }

        if !vault.is_unlocked() {
            println!("[ {} ]", screen.display());
        }
    }

    info!("CalcVault shutdown complete");
    Ok(())
}
