use axum::{routing::get, Router};
use math_quest::{
    config::ServerConfig,
    event::EventBus,
    leaderboard::{handlers, InMemoryScoreStore, PostgresScoreStore, ScoreStore},
    shared::{AppError, AppState, Leaderboards},
    websockets::{combat_websocket_handler, quiz_websocket_handler},
};
use std::error::Error;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "math_quest=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Math Quest game server");

    let config = ServerConfig::from_env()?;

    // Postgres when configured, otherwise scores live only as long as the process
    let store: Arc<dyn ScoreStore> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let store = PostgresScoreStore::new(pool);
            store.ensure_schema().await?;
            info!("Using PostgreSQL score store");
            Arc::new(store)
        }
        None => {
            info!("Using in-memory score store");
            Arc::new(InMemoryScoreStore::new())
        }
    };

    let leaderboards = Leaderboards::new(
        store,
        config.leaderboard_collection.clone(),
        config.quiz_leaderboard_collection.clone(),
    );
    let app_state = AppState::new(leaderboards, EventBus::new(), config.leaderboard_size);

    let app = Router::new()
        .route("/", get(|| async { "Math Quest" }))
        .route(
            "/leaderboard",
            get(handlers::get_leaderboard).post(handlers::submit_score),
        )
        .route("/ws/combat", get(combat_websocket_handler))
        .route("/ws/quiz", get(quiz_websocket_handler))
        .fallback(|| async { AppError::NotFound("No such route".to_string()) })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
