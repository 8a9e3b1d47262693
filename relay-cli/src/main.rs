//! # relay-cli
//!
//! CLI tool for exchanging discovery tokens through a nearby-relay server.
//!
//! ## Commands
//!
//! - `submit`: Upload a token and print the code it was filed under
//! - `fetch`: Print the token filed under a code
//!
//! ## Example
//!
//! ```bash
//! # Device A publishes its token
//! relay-cli --url http://relay.local:8080 submit QUJD
//! 4231
//!
//! # Device B reads it back
//! relay-cli --url http://relay.local:8080 fetch 4231
//! QUJD
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;
mod commands;

use client::RelayClient;
use commands::{fetch, submit};

/// CLI tool for exchanging discovery tokens through nearby-relay.
#[derive(Parser, Debug)]
#[command(name = "relay-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the relay server
    #[arg(
        long,
        global = true,
        env = "RELAY_URL",
        default_value = "http://127.0.0.1:8080"
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a token and print its code
    Submit {
        /// Opaque token, usually base64
        token: String,
    },

    /// Fetch the token filed under a code
    Fetch {
        /// Numeric code printed by `submit`
        code: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RelayClient::new(&cli.url);

    match cli.command {
        Commands::Submit { token } => {
            submit::run(&client, &token).await?;
        }
        Commands::Fetch { code } => {
            fetch::run(&client, code).await?;
        }
    }

    Ok(())
}
