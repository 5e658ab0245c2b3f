use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod connectivity;
mod db;
mod gateway;
mod models;
mod remote;
mod sync;

use commands::{
    AppContext, ConfigCommand, GoalCommand, MealCommand, SyncCommand, WeightCommand,
    WorkoutCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "fitsync")]
#[command(version)]
#[command(about = "An offline-first fitness tracking CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage workouts
    Workout(WorkoutCommand),

    /// Manage meals
    Meal(MealCommand),

    /// Manage goals
    Goal(GoalCommand),

    /// Manage weight entries
    Weight(WeightCommand),

    /// Sync queued mutations with the remote store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitsync=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Workout(cmd)) => {
            let ctx = AppContext::build(config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Meal(cmd)) => {
            let ctx = AppContext::build(config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Goal(cmd)) => {
            let ctx = AppContext::build(config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Weight(cmd)) => {
            let ctx = AppContext::build(config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let ctx = AppContext::build(config).await?;
            cmd.run(&ctx).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
