pub mod commands;
pub mod ux;

pub use clap::{Parser, Subcommand};


#[derive(Parser)]
#[command(
    name = "perch",
    version,
    about = "SQL-first schema migration engine for SQLite, written in Rust."
)]
pub struct Cli {
    #[arg(
        long = "db",
        help = "Database connection string, e.g.:\n    sqlite://db.sqlite3\n",
        env = "DB_CONNECTION_STRING",
        hide_env_values = true
    )]
    pub db_connection_string: String,

    #[arg(
        long = "dir",
        help = "Directory containing all migration scripts",
        env = "MIGRATION_DIRECTORY",
        default_value = "migrations"
    )]
    pub migration_directory: String,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Set level of verbosity. [default: INFO]\n\t-v: DEBUG\n\t-vv: TRACE\n--quiet takes precedence over --verbose."
    )]
    pub verbose: u8,

    #[arg(
        short,
        long,
        action = clap::ArgAction::SetTrue,
        help = "Disable all information logs (only ERROR level logs are shown).\n--quiet takes precedence over --verbose."
    )]
    pub quiet: bool,

    #[arg(
        long,
        action = clap::ArgAction::SetTrue,
        help = "Enable JSON output format. Logging is muted when this flag is set."
    )]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Test connection to the database.")]
    Ping {},

    #[command(about = "Discover, register, and apply pending migrations.")]
    Migrate {},

    #[command(about = "Show the status of every discovered migration.")]
    Status {},
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_migrate_subcommand() {
        let cli = Cli::parse_from(["perch", "--db", "sqlite://db.sqlite3", "migrate"]);

        assert_eq!(cli.db_connection_string, "sqlite://db.sqlite3");
        assert_eq!(cli.migration_directory, "migrations");
        assert!(matches!(cli.command, Commands::Migrate {}));
    }
}
