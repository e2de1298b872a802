use clap::{Parser, Subcommand};

mod commands;

use commands::ingest::IngestArgs;
use commands::serve::ServeArgs;
use commands::token::TokenCommand;

#[derive(Parser, Debug)]
#[command(name = "tome", version, about = "Tome knowledge-base MCP server")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the MCP server.
    Serve(ServeArgs),

    /// Manage bearer tokens for the MCP endpoint.
    Token(TokenCommand),

    /// Build a collection snapshot from a JSON document set.
    Ingest(IngestArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Token(cmd) => commands::token::run(cmd),
        Command::Ingest(args) => commands::ingest::run(args).await,
    }
}
