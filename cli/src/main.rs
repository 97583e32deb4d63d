//! Command-line query client for the Quire content service.
//!
//! Commands:
//! - entries: List entries and print their rendered text
//! - render: Render one entry through the server
//! - tree: Show entries with their timestamped segments
//! - select: Call the select placeholder
//! - query: Send a query envelope
//! - insert: Insert a payload (broadcast to watchers)
//! - rescan: Ask the server to re-read its content directory
//! - watch: Stream realtime events
//!
//! Configuration via environment:
//! - QUIRE_URL: Base URL of the server (default: http://localhost:3000)
//! - QUIRE_ATTEMPTS: Attempts per request on connection errors and 5xx (default: 3)

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    Context, entries::EntriesArgs, insert::InsertArgs, query::QueryArgs, render::RenderArgs,
};

/// Quire CLI
///
/// Query a Quire server from the command line. Prints JSON by default;
/// pass --human for formatted output.
#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Quire server URL
    #[arg(
        long,
        env = "QUIRE_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Attempts per request when the server is unreachable or failing
    #[arg(long, env = "QUIRE_ATTEMPTS", default_value_t = commands::DEFAULT_ATTEMPTS, global = true)]
    attempts: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entries and print each one rendered
    Entries(EntriesArgs),

    /// Render a single entry by id
    Render(RenderArgs),

    /// Show the entry tree with timestamped segments
    Tree,

    /// Call the select placeholder route
    Select,

    /// Send a query envelope
    Query(QueryArgs),

    /// Insert a payload and notify realtime clients
    Insert(InsertArgs),

    /// Re-read the server's content directory
    Rescan,

    /// Print realtime events until the connection closes
    Watch,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let ctx = match Context::new(&cli.url, cli.human, cli.attempts) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Entries(args) => commands::entries::execute(&ctx, args).await,
        Commands::Render(args) => commands::render::execute(&ctx, args).await,
        Commands::Tree => commands::tree::execute(&ctx).await,
        Commands::Select => commands::select::execute(&ctx).await,
        Commands::Query(args) => commands::query::execute(&ctx, args).await,
        Commands::Insert(args) => commands::insert::execute(&ctx, args).await,
        Commands::Rescan => commands::rescan::execute(&ctx).await,
        Commands::Watch => commands::watch::execute(&ctx).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
