//! Token management commands.
//!
//! `tome token add` - Issue a new bearer token.
//! `tome token list` - List issued tokens.
//! `tome token revoke` - Revoke a token.

use anyhow::Context;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tome_core::TokenStore;

/// Token-related commands.
#[derive(Debug, Args)]
pub struct TokenCommand {
    /// Token file path.
    #[arg(long, default_value = "tokens.json")]
    pub tokens_file: PathBuf,

    #[command(subcommand)]
    pub command: TokenSubcommand,
}

/// Token subcommands.
#[derive(Debug, Subcommand)]
pub enum TokenSubcommand {
    /// Issue a new token.
    Add {
        /// Who or what the token is for.
        description: String,
    },

    /// List issued tokens. Only a prefix of each token is shown.
    List,

    /// Revoke a token.
    Revoke {
        /// The full token string to revoke.
        token: String,
    },
}

pub fn run(cmd: TokenCommand) -> anyhow::Result<()> {
    let store = TokenStore::new(cmd.tokens_file);

    match cmd.command {
        TokenSubcommand::Add { description } => {
            let token = store
                .add(&description)
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            println!("Token created:\n  {token}\n  Description: {description:?}");
        }
        TokenSubcommand::List => {
            let tokens = store.load();
            if tokens.is_empty() {
                println!("No tokens.");
                return Ok(());
            }
            println!("TOKEN (first 16 chars)  DESCRIPTION");
            println!("{}", "-".repeat(60));
            for (token, entry) in &tokens {
                let prefix: String = token.chars().take(16).collect();
                println!("  {prefix}...  {}", entry.description);
            }
            println!("\nTotal: {}", tokens.len());
        }
        TokenSubcommand::Revoke { token } => {
            let removed = store
                .revoke(&token)
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            match removed {
                Some(entry) => println!("Revoked token for: {:?}", entry.description),
                None => anyhow::bail!("token not found"),
            }
        }
    }

    Ok(())
}
