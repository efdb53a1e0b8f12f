//! # doot
//!
//! Loads settings, picks a store and serves the board until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, HmacSessionCodec};
use configs::{LogFormat, LogSettings, Settings};
use domains::{PasswordHasher, SessionCodec};
use storage_adapters::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let codec: Arc<dyn SessionCodec> = Arc::new(
        HmacSessionCodec::new(settings.session.secret.expose_secret().as_bytes())
            .context("session secret")?,
    );

    let state = build_state(&settings, hasher, codec).await?;
    let app = router(state, &settings.server.static_dir);

    let addr = settings.server.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, mode = ?settings.mode, "doot listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("doot stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    match log.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn build_state(
    settings: &Settings,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<dyn SessionCodec>,
) -> anyhow::Result<AppState> {
    let ttl = chrono::Duration::days(settings.session.ttl_days);
    let secure = settings.is_production();

    #[cfg(feature = "db-postgres")]
    if let Some(url) = &settings.database.url {
        let store = storage_adapters::PgStore::connect(url.expose_secret(), settings.database.max_connections)
            .await
            .context("connecting to postgres")?;
        store.migrate().await.context("running migrations")?;
        info!(max_connections = settings.database.max_connections, "postgres store ready");
        return Ok(AppState::new(Arc::new(store), hasher, codec, ttl, secure));
    }

    #[cfg(not(feature = "db-postgres"))]
    if settings.database.url.is_some() {
        warn!("DATABASE_URL is set but this build has no postgres support");
    }

    if settings.is_production() {
        anyhow::bail!("production mode needs a database; set DATABASE_URL");
    }
    warn!("no database configured, data lives in memory and is lost on exit");
    Ok(AppState::new(Arc::new(MemoryStore::new()), hasher, codec, ttl, secure))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
        info!("received ctrl-c, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("received terminate, shutting down");
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
