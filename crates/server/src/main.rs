//! Inkwell server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use fred::interfaces::ClientLike;
use inkwell_api::AppState;
use inkwell_common::{Config, MemoryStore, RedisStore, SharedStore};
use inkwell_core::{LogMailer, Mailer, SmtpMailer};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inkwell=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Any origin without credentials when none are configured, otherwise the
/// listed origins with cookies allowed.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed).allow_credentials(true)
    }
}

async fn connect_store(config: &Config) -> Result<SharedStore, Box<dyn std::error::Error>> {
    if !config.redis.enabled {
        warn!("Redis disabled, using in-memory store (single instance only)");
        return Ok(Arc::new(MemoryStore::new()));
    }

    info!("Connecting to Redis...");
    let redis_config = fred::types::config::Config::from_url(&config.redis.url)?;
    let client = fred::clients::Client::new(redis_config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;
    info!("Connected to Redis");

    Ok(Arc::new(RedisStore::new(Arc::new(client), &config.redis.prefix)))
}

fn build_mailer(config: &Config) -> Result<Arc<dyn Mailer>, Box<dyn std::error::Error>> {
    match &config.email {
        Some(email) => {
            info!(host = %email.smtp_host, "Sending mail over SMTP");
            Ok(Arc::new(SmtpMailer::new(email)?))
        }
        None => {
            warn!("No SMTP configured, outgoing mail will only be logged");
            Ok(Arc::new(LogMailer::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Also loads .env
    let config = Config::load()?;
    init_tracing(config.server.json_logs);

    info!("Starting inkwell server...");

    let db = inkwell_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    inkwell_db::migrate(&db).await?;
    info!("Migrations completed");

    let store = connect_store(&config).await?;
    let mailer = build_mailer(&config)?;
    let state = AppState::new(Arc::new(db), store, mailer, &config);

    let app = inkwell_api::app(state)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
