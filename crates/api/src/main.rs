//! Fluenta gamification API server

use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api=debug".parse()?)
                .add_directive("engine=debug".parse()?)
                .add_directive("db=debug".parse()?),
        )
        .init();

    info!("🎯 Starting Fluenta gamification API");

    // Load configuration
    let config = common::Config::from_env();

    // Connect to database
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Start the expired-challenge sweep (if enabled)
    if config.sweep_interval_minutes > 0 {
        let sweep_pool = pool.clone();
        let interval = Duration::from_secs(config.sweep_interval_minutes as u64 * 60);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match db::challenges::delete_expired(&sweep_pool, Utc::now()).await {
                    Ok(0) => {}
                    Ok(swept) => info!("Swept {} expired challenge sets", swept),
                    Err(e) => warn!("Challenge sweep failed: {}", e),
                }
            }
        });
        info!(
            "🧹 Challenge sweep enabled (every {} minutes)",
            config.sweep_interval_minutes
        );
    } else {
        info!("🧹 Challenge sweep disabled (SWEEP_INTERVAL_MINUTES=0)");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), pool));

    // Build API router with state
    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/activity", post(routes::activity::record))
        .route("/api/users/:user_id/profile", get(routes::profiles::get))
        .route(
            "/api/users/:user_id/activity",
            get(routes::profiles::activity),
        )
        .route(
            "/api/users/:user_id/achievements",
            get(routes::achievements::user_progress),
        )
        .route(
            "/api/users/:user_id/challenges",
            get(routes::challenges::for_user),
        )
        .route("/api/achievements", get(routes::achievements::list))
        .route("/api/leaderboard", get(routes::leaderboard::global))
        .route("/api/recalculate", post(routes::recalc::trigger))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
