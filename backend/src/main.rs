use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use backend::config::AppConfig;
use backend::{create_router, initialize_backend};

#[derive(Parser, Debug)]
#[command(name = "clapier")]
#[command(about = "Rabbitry registry, breeding log and pedigree service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database URL, e.g. sqlite:clapier.db
    #[arg(long, env = "CLAPIER_DATABASE_URL")]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "CLAPIER_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Clapier listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
