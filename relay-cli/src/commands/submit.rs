//! Submit a token to the relay.

use anyhow::{Context, Result};

use crate::client::RelayClient;

/// Run the submit command.
///
/// Prints the assigned code on success so it can be piped or read aloud.
pub async fn run(client: &RelayClient, token: &str) -> Result<()> {
    let response = client
        .submit(token)
        .await
        .context("Failed to submit token")?;

    match response.id {
        Some(code) if response.success => {
            println!("{}", code);
            Ok(())
        }
        Some(code) => anyhow::bail!("Relay could not store token under code {}", code),
        None => anyhow::bail!("Relay rejected the submission"),
    }
}
