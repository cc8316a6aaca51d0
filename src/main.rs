use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spy_cat_agency::{api, config::Config, services::Services};

#[derive(Parser)]
#[command(name = "spycat")]
#[command(about = "Spy cat, mission and target tracking service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides SPYCAT_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API (overrides SPYCAT_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite database file (overrides SPYCAT_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Apply pending database migrations and exit
    Migrate {
        /// SQLite database file (overrides SPYCAT_DB_PATH)
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "spy_cat_agency=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let db = config.open_database()?;
    db.migrate().context("Failed to migrate database")?;

    let breeds = config
        .breed_validator()
        .context("Failed to build breed catalog client")?;
    let app = api::create_router(Services::new(db, breeds));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Spy cat agency listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { host, port, db }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if db.is_some() {
                config.database_path = db;
            }
            serve(config).await?;
        }
        Some(Commands::Migrate { db }) => {
            if db.is_some() {
                config.database_path = db;
            }
            config
                .open_database()?
                .migrate()
                .context("Failed to migrate database")?;
            tracing::info!("Database is up to date");
        }
        None => serve(config).await?,
    }

    Ok(())
}
