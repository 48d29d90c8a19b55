use std::sync::Arc;

use catalog::Catalog;
use clap::Parser;
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[derive(Debug, Parser)]
#[command(name = "miniapp", about = "Serve the mini app catalog")]
struct Args {
    /// Settings file (TOML). Defaults to an optional `settings.toml`.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "miniapp={level},server={level},catalog={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let catalog = Catalog::builder()
        .database(db)
        .media_root(&settings.media.root)
        .build();
    tracing::info!("Serving media from {}", catalog.media_root().display());

    let state = server::ServerState::new(Arc::new(catalog))?;
    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(state, listener).await?;
    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("Database ready");
    Ok(database)
}
