//! Load and validate a configuration without starting the bridge.

use anyhow::Result;

use crate::config::Config;

/// Run the check-config command.
pub fn run(config: &Config, mock: bool) -> Result<()> {
    config.validate(mock)?;

    println!("=== meetbridge config ===");
    println!();
    match &config.firebase {
        Some(firebase) => {
            println!("Firebase:");
            println!("  Project:   {}", firebase.project_id);
            println!("  Database:  {}", firebase.database_id);
            println!("  Auth:      {}", firebase.auth_endpoint);
            println!("  Firestore: {}", firebase.firestore_endpoint);
            println!("  Page size: {}", firebase.page_size);
        }
        None => println!("Firebase: NOT CONFIGURED (mock only)"),
    }
    println!();
    println!("Collections:");
    println!("  Meetings: {}", config.collections.meetings);
    println!(
        "  Guests:   {} (by {})",
        config.collections.guests, config.collections.dependent_field
    );
    println!();
    println!("Bridge:");
    println!("  Delete failures: {:?}", config.bridge.delete_failure);
    println!(
        "  Fetch retries:   {} (up to {:?} total backoff)",
        config.bridge.fetch_retry_attempts,
        config.bridge.max_fetch_backoff()
    );
    if mock {
        println!();
        println!(
            "Mock seed: {} accounts, {} meetings, {} guests",
            config.mock.accounts.len(),
            config.mock.meetings.len(),
            config.mock.guests.len()
        );
    }
    println!();
    println!("OK");
    Ok(())
}
