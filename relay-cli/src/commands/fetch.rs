//! Fetch a token from the relay.

use anyhow::{Context, Result};
use relay_types::Code;

use crate::client::RelayClient;

/// Run the fetch command.
pub async fn run(client: &RelayClient, code: i64) -> Result<()> {
    let code = Code::new(code);
    let response = client
        .fetch(code)
        .await
        .with_context(|| format!("Failed to fetch code {}", code))?;

    if !response.success {
        anyhow::bail!("No token found for code {}", code);
    }

    println!("{}", response.token);
    Ok(())
}
