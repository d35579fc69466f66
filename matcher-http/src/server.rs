use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use resume_matcher::{ResumeMatcher, Settings};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::handlers::{health, match_job, metrics_handler, upload_resume, AppState};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MAX_BODY_MB: usize = 20;

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub bind_addr: String,
    pub settings: Settings,
    pub max_body_mb: usize,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            settings: Settings::default(),
            max_body_mb: DEFAULT_MAX_BODY_MB,
        }
    }
}

impl ServeConfig {
    /// Settings from the environment, plus `MATCHER_MAX_BODY_MB`.
    pub fn from_env(bind_addr: impl Into<String>) -> Self {
        let max_body_mb = std::env::var("MATCHER_MAX_BODY_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_MB);
        Self {
            bind_addr: bind_addr.into(),
            settings: Settings::from_env(),
            max_body_mb,
        }
    }
}

pub fn build_router(state: Arc<AppState>, max_body_mb: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/upload_resume", post(upload_resume))
        .route("/match", post(match_job))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_mb * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

pub async fn serve(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let startup_start = std::time::Instant::now();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matcher = ResumeMatcher::from_settings(&config.settings)?;

    // The index service may come up after us; keep serving and let index
    // calls report their own errors.
    let index_ready = match matcher.startup().await {
        Ok(outcome) => {
            tracing::info!(?outcome, "Index provisioning complete");
            true
        }
        Err(e) => {
            tracing::error!("Index provisioning failed, continuing degraded: {}", e);
            false
        }
    };

    let state = Arc::new(AppState {
        matcher,
        start_time: std::time::Instant::now(),
        index_ready,
    });
    let app = build_router(state, config.max_body_mb);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    print_startup_banner(
        &local_addr.to_string(),
        &config.settings,
        index_ready,
        startup_start.elapsed().as_millis(),
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn print_startup_banner(bind_addr: &str, settings: &Settings, index_ready: bool, startup_ms: u128) {
    use colored::Colorize;

    let url = format!("http://{}", bind_addr);
    let version = format!("v{}", env!("CARGO_PKG_VERSION"));
    let timing = format!("ready in {}ms", startup_ms);

    println!();
    println!(
        "  {} {}  {}",
        "Resume Matcher".bold().bright_green(),
        version.as_str().dimmed(),
        timing.as_str().dimmed(),
    );
    println!();
    println!("  {}  Local:  {}", "➜".green(), url.as_str().cyan());
    println!(
        "  {}  Index:  {} @ {}",
        "➜".green(),
        settings.index.name.as_str().cyan(),
        settings.client.host.as_str().dimmed()
    );
    if !index_ready {
        println!();
        println!(
            "  {}",
            "WARNING: index provisioning failed; uploads and matches will error until the index service is reachable"
                .yellow()
        );
    }
    println!();
}
