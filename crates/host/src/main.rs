//! Employee identity host: seeds the identity store and serves the HTTP API.

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use host_lib::config::HostConfig;
use host_lib::ServeOptions;

#[derive(Parser)]
#[command(name = "employee-identity")]
#[command(about = "Employee identity host")]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database and start the HTTP server
    Serve {
        /// Override SERVER_HOST
        #[arg(long)]
        host: Option<String>,
        /// Override SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
        /// Drop the database before seeding
        #[arg(long, env = "SEED_CLEAR_DATABASE")]
        clear_database: bool,
        /// Only apply migrations on startup
        #[arg(long)]
        skip_seed: bool,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Seed default roles and accounts, then exit
    Seed {
        /// Drop the database before seeding
        #[arg(long, env = "SEED_CLEAR_DATABASE")]
        clear_database: bool,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

impl From<MigrateAction> for identity_service_lib::MigrateAction {
    fn from(action: MigrateAction) -> Self {
        match action {
            MigrateAction::Up => Self::Up,
            MigrateAction::Down => Self::Down,
            MigrateAction::Status => Self::Status,
            MigrateAction::Fresh => Self::Fresh,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let default_filter = if cli.verbose {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            clear_database,
            skip_seed,
        } => {
            let mut config = HostConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }

            info!("Starting employee identity host");
            host_lib::run_server(
                config,
                ServeOptions {
                    clear_database,
                    skip_seed,
                },
            )
            .await?;
        }
        Commands::Migrate { action } => {
            identity_service_lib::run_migrations(action.into()).await?;
        }
        Commands::Seed { clear_database } => {
            host_lib::run_seed(clear_database).await?;
        }
    }

    Ok(())
}
