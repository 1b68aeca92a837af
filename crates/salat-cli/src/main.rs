use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "salat", version, about = "Prayer times, adherence tracking and reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Location profile
    Location {
        #[command(subcommand)]
        action: commands::location::LocationAction,
    },
    /// Calculation settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Print the day's prayer times
    Times(commands::times::TimesArgs),
    /// Print per-prayer status
    Status(commands::status::StatusArgs),
    /// Log a performed prayer
    Log(commands::log::LogArgs),
    /// Weekly/monthly statistics and streaks
    Stats,
    /// Current and best streaks
    Streaks,
    /// Adherence history
    History,
    /// Reminder preferences, scheduling and delivery
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SALAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Location { action } => commands::location::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Times(args) => commands::times::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Log(args) => commands::log::run(args),
        Commands::Stats => commands::stats::run(commands::stats::StatsView::Summary),
        Commands::Streaks => commands::stats::run(commands::stats::StatsView::Streaks),
        Commands::History => commands::stats::run(commands::stats::StatsView::History),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
