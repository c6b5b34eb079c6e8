use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardex_core::cardapi::CardApiClient;
use cardex_core::cli::{Cli, Commands, DbCommands};
use cardex_core::{cli, config, create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    let args = Cli::parse();

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Db(DbCommands::BackfillProfiles) => {
            cli::handle_db_backfill_profiles(&config).await
        }
        Commands::Config => cli::handle_config_validate(&config),
    }
}

async fn serve(config: config::Config) -> anyhow::Result<()> {
    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let card_api = CardApiClient::new(config.card_api_url.clone(), config.card_api_delay_ms);
    tracing::info!("Card API client initialized with URL: {}", config.card_api_url);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let app = create_app(AppState {
        db: pool,
        card_api,
        config,
    });

    tracing::info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
