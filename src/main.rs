//! vaultctl - credential vault envelope tool
//!
//! Reads `VAULT_MASTER_KEY` from the environment (or `.env`) and exposes the
//! envelope cipher and domain matcher on the command line.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use credential_vault::{
    hostname_from_url, DomainMatcher, EnvelopeCipher, HostSuffixMatcher, InMemoryCredentialStore,
    KeyManager, MasterKey, SecretRecord, SubstringMatcher, Vault, VaultConfig, VaultError,
};

#[derive(Parser)]
#[command(name = "vaultctl")]
#[command(about = "Credential vault envelope tool")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new value for VAULT_MASTER_KEY
    Keygen,

    /// Encrypt a secret into an iv:tag:ciphertext envelope
    Encrypt {
        /// Secret to encrypt
        plaintext: Option<String>,

        /// Read the secret from stdin instead
        #[arg(long, conflicts_with = "plaintext")]
        stdin: bool,
    },

    /// Decrypt an envelope
    Decrypt {
        envelope: String,
    },

    /// Print the hostname of a page URL
    Host {
        url: String,
    },

    /// Rank stored secrets for the page being viewed
    Suggest {
        /// Hostname of the current page
        #[arg(long, default_value = "")]
        hostname: String,

        /// JSON array of secret records exported from the credential store
        #[arg(long)]
        records: PathBuf,

        /// Free-text search; replaces domain suggestions when set
        #[arg(long)]
        query: Option<String>,

        /// Compare hosts on label boundaries instead of raw substrings
        #[arg(long)]
        strict: bool,

        /// Decrypt and print suggested passwords
        #[arg(long)]
        reveal: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Keygen => {
            let key = MasterKey::generate();
            println!("{}", key.to_hex().as_str());
        }
        Command::Encrypt { plaintext, stdin } => {
            let keys = load_keys()?;
            let plaintext = match (plaintext, stdin) {
                (_, true) => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read secret from stdin")?;
                    buf.trim_end_matches(&['\r', '\n'][..]).to_string()
                }
                (Some(plaintext), false) => plaintext,
                (None, false) => bail!("Provide a secret or pass --stdin"),
            };

            let envelope = EnvelopeCipher::encrypt(keys.master_key()?, &plaintext)?;
            println!("{}", envelope);
        }
        Command::Decrypt { envelope } => {
            let keys = load_keys()?;
            let plaintext = EnvelopeCipher::decrypt(keys.master_key()?, envelope.trim())
                .context("Cannot read this secret")?;
            println!("{}", plaintext);
        }
        Command::Host { url } => match hostname_from_url(&url) {
            Some(hostname) => println!("{}", hostname),
            None => bail!("No hostname in {}", url),
        },
        Command::Suggest { hostname, records, query, strict, reveal } => {
            let raw = std::fs::read_to_string(&records)
                .with_context(|| format!("Failed to read {}", records.display()))?;
            let parsed: Vec<SecretRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid records in {}", records.display()))?;
            let live: Vec<SecretRecord> = parsed.into_iter().filter(|r| !r.is_deleted()).collect();

            let matcher: &dyn DomainMatcher =
                if strict { &HostSuffixMatcher } else { &SubstringMatcher };
            let keys = if reveal {
                load_keys()?
            } else {
                Arc::new(KeyManager::with_loader(|| {
                    Err(VaultError::Configuration("Key not loaded without --reveal".into()))
                }))
            };

            let vault = Vault::new(Arc::new(InMemoryCredentialStore::with_records(live)), keys);
            let listing = vault.listing(&hostname, query.as_deref(), matcher)?;

            if !listing.suggested.is_empty() {
                println!("Suggested for {}:", hostname);
                for record in &listing.suggested {
                    print_record(&vault, record, reveal);
                }
            }
            println!("All secrets:");
            for record in &listing.other {
                print_record(&vault, record, false);
            }
        }
    }

    Ok(())
}

/// Import the master key up front so configuration problems fail the command immediately
fn load_keys() -> Result<Arc<KeyManager>> {
    let config = VaultConfig::from_env()?;
    let keys = KeyManager::from_config(&config);
    keys.master_key().context("Master key configuration is invalid")?;
    info!("Master key loaded");
    Ok(Arc::new(keys))
}

fn print_record(vault: &Vault<InMemoryCredentialStore>, record: &SecretRecord, reveal: bool) {
    let username = record.username.as_deref().unwrap_or("-");
    let url = record.url().unwrap_or("-");
    print!("  [{}] {}  user={}  url={}", record.secret_type, record.title, username, url);

    if reveal {
        match vault.reveal_record(record) {
            Ok(password) => print!("  password={}", password.as_str()),
            Err(e) => print!("  password=[cannot display secret: {}]", e),
        }
    }
    println!();
}
