use clap::Parser;
use perch::cli::{self, commands, ux};


/// Entry point for the perch CLI.
///
/// Delegates to subcommands:
/// - `ping`: Verify connectivity to the database.
/// - `migrate`: Discover, register, and apply pending migrations.
/// - `status`: Report the state of every discovered migration.
///
/// The engine itself only ever returns errors; choosing the process exit
/// status happens here.
#[tokio::main]
async fn main() {
    let args: cli::Cli = cli::Cli::parse();
    let json = args.json;

    ux::setup_logging(args.verbose, args.quiet, json);

    if let Err(e) = commands::run(args).await {
        if json {
            eprintln!("{e:#}");
        } else {
            tracing::error!("{e:#}");
        }
        std::process::exit(1);
    }
}
