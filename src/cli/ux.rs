use crate::migrate::{MigrationState, MigrationStatus};
use std::fmt::Write;


pub fn setup_logging(verbose: u8, quiet: bool, json: bool) {
    if json {
        // Mute all logging if JSON output is enabled
        tracing::subscriber::set_global_default(tracing::subscriber::NoSubscriber::default())
            .expect("Setting no-op subscriber failed");
        return;
    }

    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting default subscriber failed!");
}


pub fn render_status(statuses: &[MigrationStatus]) {
    let mut output = "--- Migration status ---\n".to_string();

    for status in statuses {
        let state = match status.state {
            MigrationState::Applied => "applied",
            MigrationState::Pending => "pending",
            MigrationState::Unregistered => "unregistered",
        };

        let registered_at = status
            .registered_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        // writeln! appends to the String
        writeln!(
            &mut output,
            "{:>6}  {:<44}  {:<12}  registered: {:<19}  down: {}",
            status.sequence,
            status.name,
            state,
            registered_at,
            if status.has_down { "yes" } else { "no" },
        )
        .unwrap();
    }

    print!("{output}");
}
