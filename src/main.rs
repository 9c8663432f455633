use colgados_web::{ColgadosState, Config, colgados_router, db::ColgadosStorage};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<set>" }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel,
        plex_endpoint = %cfg.plex_endpoint,
        sharepoint_site = %cfg.sharepoint_site_url,
        secret_key = redacted(&cfg.secret_key),
        plex_token = redacted(&cfg.plex_token),
        sharepoint_pass = redacted(&cfg.sharepoint_pass),
    );
    if cfg.insecure_cookie {
        warn!("session cookies are sent without the Secure attribute");
    }

    let storage = ColgadosStorage::connect(&cfg.sqlx_database_url(), cfg.db_max_connections).await?;

    let addr = cfg.listen_addr.clone();
    let state = ColgadosState::new(storage, cfg)?;
    let app = colgados_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
