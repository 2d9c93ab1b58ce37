use crate::cli::{Cli, Commands, ux};
use crate::db::SqliteStore;
use crate::migrate::MigrationRunner;


pub async fn run(args: Cli) -> anyhow::Result<()> {
    match args.command {
        Commands::Ping {} => ping(&args.db_connection_string).await,
        Commands::Migrate {} => {
            migrate(&args.db_connection_string, &args.migration_directory, args.json).await
        }
        Commands::Status {} => {
            status(&args.db_connection_string, &args.migration_directory, args.json).await
        }
    }
}

async fn ping(db_connection_string: &str) -> anyhow::Result<()> {
    tracing::info!("Pinging database...");

    SqliteStore::connect(db_connection_string).await?;

    tracing::info!("Connection successful");

    Ok(())
}

async fn migrate(
    db_connection_string: &str,
    migration_directory: &str,
    json: bool,
) -> anyhow::Result<()> {
    let store = SqliteStore::connect(db_connection_string).await?;
    let mut runner = MigrationRunner::new(migration_directory, store);

    let report = runner.execute().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

async fn status(
    db_connection_string: &str,
    migration_directory: &str,
    json: bool,
) -> anyhow::Result<()> {
    let store = SqliteStore::connect(db_connection_string).await?;
    let mut runner = MigrationRunner::new(migration_directory, store);

    let statuses = runner.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        ux::render_status(&statuses);
    }

    Ok(())
}
