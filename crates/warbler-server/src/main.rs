use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use tracing::{info, warn};

use warbler_api::auth::{AppState, AppStateInner};

/// Secrets that must never sign sessions outside local development.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "it's a secret", "dev-secret-change-me"];

struct Config {
    db_path: PathBuf,
    host: String,
    port: u16,
    secret_key: String,
    static_dir: PathBuf,
    dev_mode: bool,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let dev_mode = std::env::var("WARBLER_ENV").is_ok_and(|v| v == "development");

        let secret_key = std::env::var("WARBLER_SECRET_KEY").unwrap_or_default();
        let placeholder = secret_key.is_empty() || PLACEHOLDER_SECRETS.contains(&secret_key.as_str());
        let secret_key = match (placeholder, dev_mode) {
            (false, _) => secret_key,
            (true, true) => {
                warn!("WARBLER_SECRET_KEY unset or placeholder; using the development key");
                "dev-secret-change-me".to_string()
            }
            (true, false) => {
                bail!("WARBLER_SECRET_KEY is unset or still a placeholder; set it in .env and restart")
            }
        };

        Ok(Self {
            db_path: std::env::var("WARBLER_DB_PATH")
                .unwrap_or_else(|_| "warbler.db".into())
                .into(),
            host: std::env::var("WARBLER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("WARBLER_PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()?,
            secret_key,
            static_dir: std::env::var("WARBLER_STATIC_DIR")
                .unwrap_or_else(|_| "static".into())
                .into(),
            dev_mode,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = warbler_db::Database::open(&config.db_path)?;

    let static_dir = config.static_dir.is_dir().then_some(config.static_dir.clone());
    if static_dir.is_none() {
        warn!("Static directory {} not found; /static is disabled", config.static_dir.display());
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.secret_key,
        static_dir,
    });

    let app = warbler_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        "Warbler listening on {} ({} mode)",
        addr,
        if config.dev_mode { "development" } else { "production" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
