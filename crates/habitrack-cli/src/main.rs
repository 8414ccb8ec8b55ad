use clap::{Parser, Subcommand};
use habitrack_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "habitrack", version, about = "Habitrack CLI")]
struct Cli {
    /// Account to act as
    #[arg(long, short, global = true, env = "HABITRACK_USER")]
    user: Option<String>,
    /// Password of the account
    #[arg(long, global = true, env = "HABITRACK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Checkoff logging
    Checkoff {
        #[command(subcommand)]
        action: commands::checkoff::CheckoffAction,
    },
    /// Streak and success-rate analysis
    Analyze {
        #[command(subcommand)]
        action: commands::analyze::AnalyzeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Example data
    Demo {
        #[command(subcommand)]
        action: commands::demo::DemoAction,
    },
}

/// Logs go to stderr; stdout carries JSON only.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = Config::load_or_default().logging.level;
        EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "habitrack starting");

    let creds = commands::Credentials {
        user: cli.user,
        password: cli.password,
    };
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action, &creds),
        Commands::Habit { action } => commands::habit::run(action, &creds),
        Commands::Checkoff { action } => commands::checkoff::run(action, &creds),
        Commands::Analyze { action } => commands::analyze::run(action, &creds),
        Commands::Config { action } => commands::config::run(action),
        Commands::Demo { action } => commands::demo::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
