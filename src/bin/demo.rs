//! Credential Vault Demo
//!
//! Walks through saving, revealing, matching and autofilling secrets with a
//! throwaway master key and the in-memory credential store.

use credential_vault::{
    EnvelopeCipher, HostSuffixMatcher, InMemoryCredentialStore, KeyManager, MasterKey, NewSecret,
    SecretType, SubstringMatcher, Vault, VaultError,
};
use std::sync::Arc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           CREDENTIAL VAULT DEMO - Envelope Encryption        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    // A fresh key stands in for VAULT_MASTER_KEY
    let key_hex = MasterKey::generate().to_hex();
    let keys = Arc::new(KeyManager::with_loader(move || Ok(key_hex.clone())));
    let storage = Arc::new(InMemoryCredentialStore::new());
    let vault = Vault::new(Arc::clone(&storage), Arc::clone(&keys));
    println!("📦 Vault initialized (master key loaded: {})", keys.is_loaded());
    println!();

    // ========================================================================
    // Demo 1: Save and reveal
    // ========================================================================
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📝 DEMO 1: Save and reveal a secret");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let github = vault
        .add_secret(
            NewSecret::new("GitHub", "correct horse battery staple 🐴")
                .with_username("octocat")
                .with_url("github.com"),
        )
        .expect("Failed to save secret");
    println!("   ✓ Master key imported on first use: {}", keys.is_loaded());
    println!("   Stored envelope: {}", github.envelope);

    let revealed = vault.reveal(&github.id).expect("Failed to reveal secret");
    println!("   Revealed: \"{}\"", revealed.as_str());
    println!();

    // ========================================================================
    // Demo 2: Same plaintext, different envelopes
    // ========================================================================
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🎲 DEMO 2: Fresh IV per encryption");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let key = keys.master_key().expect("Master key unavailable");
    let first = EnvelopeCipher::encrypt(key, "same-password").expect("Encryption failed");
    let second = EnvelopeCipher::encrypt(key, "same-password").expect("Encryption failed");
    println!("   First:  {}", first);
    println!("   Second: {}", second);
    println!("   Envelopes differ: {}", first != second);
    println!();

    // ========================================================================
    // Demo 3: Tamper detection
    // ========================================================================
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🛡️  DEMO 3: Tampered and malformed envelopes");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let wire = first.to_string();
    let flipped = match wire.chars().last() {
        Some('0') => format!("{}1", &wire[..wire.len() - 1]),
        _ => format!("{}0", &wire[..wire.len() - 1]),
    };
    for (label, candidate) in [("bit flip", flipped.as_str()), ("truncated", "deadbeef:cafe")] {
        match EnvelopeCipher::decrypt(key, candidate) {
            Ok(_) => println!("   ✗ {}: unexpectedly decrypted", label),
            Err(VaultError::Authentication) => println!("   ✓ {}: authentication failed", label),
            Err(e) => println!("   ✓ {}: {}", label, e),
        }
    }
    println!();

    // ========================================================================
    // Demo 4: Domain suggestions
    // ========================================================================
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🌐 DEMO 4: Suggestions for the current page");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    vault
        .add_secret(
            NewSecret::new("Example admin", "adm1n")
                .with_username("admin")
                .with_url("https://example.com/login")
                .with_type(SecretType::Cms),
        )
        .expect("Failed to save secret");
    vault
        .add_secret(NewSecret::new("Example mail", "m4il").with_url("example.com"))
        .expect("Failed to save secret");
    vault
        .add_secret(
            NewSecret::new("Prod database", "db-pass")
                .with_type(SecretType::Db)
                .with_client("Example Inc")
                .with_project("Relaunch"),
        )
        .expect("Failed to save secret");

    let hostname = "app.example.com";
    for (name, listing) in [
        ("substring", vault.listing(hostname, None, &SubstringMatcher)),
        ("host suffix", vault.listing(hostname, None, &HostSuffixMatcher)),
    ] {
        let listing = listing.expect("Listing failed");
        let suggested: Vec<&str> = listing.suggested.iter().map(|r| r.title.as_str()).collect();
        let other: Vec<&str> = listing.other.iter().map(|r| r.title.as_str()).collect();
        println!("   [{}] suggested for {}: {:?}", name, hostname, suggested);
        println!("   [{}] other: {:?}", name, other);
    }

    let searched = vault
        .listing(hostname, Some("relaunch"), &SubstringMatcher)
        .expect("Listing failed");
    println!(
        "   Search \"relaunch\": {:?}",
        searched.other.iter().map(|r| r.title.as_str()).collect::<Vec<_>>()
    );
    println!();

    // ========================================================================
    // Demo 5: Autofill
    // ========================================================================
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🔑 DEMO 5: Autofill on https://github.com/login");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let candidates = vault
        .autofill_candidates("https://github.com/login")
        .expect("Autofill lookup failed");
    for candidate in &candidates {
        let credentials = vault.fill(&candidate.id).expect("Fill failed");
        println!(
            "   ✓ {}: user={} password={}",
            candidate.title,
            credentials.username.as_deref().unwrap_or("-"),
            credentials.password.as_str()
        );
    }
    println!();

    println!("=== Summary ===");
    println!("- Master key: 32-byte AES-256 key from VAULT_MASTER_KEY, imported once");
    println!("- Envelope: hex iv(12B):tag(16B):ciphertext, fresh IV per save");
    println!("- Matching: substring heuristic by default, host-suffix strategy available");
}
