use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::mpsc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use kstores_api::config::{init_tracing, load_config};
use kstores_api::db::{establish_connection_from_app_config, run_migrations};
use kstores_api::events::{process_events, EventSender};
use kstores_api::{api_v1_routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);
    info!(environment = %config.environment, "starting kstores-api");

    let db = Arc::new(
        establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to the database")?,
    );
    if config.auto_migrate {
        run_migrations(&db)
            .await
            .context("failed to run migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(1024);
    tokio::spawn(process_events(event_rx));
    let event_sender = Arc::new(EventSender::new(event_tx));

    let state = Arc::new(AppState::new(db, config.clone(), event_sender));

    let cors = match &config.cors_allowed_origins {
        Some(origins) => {
            let origins = origins
                .split(',')
                .map(|o| o.trim().parse::<HeaderValue>())
                .collect::<Result<Vec<_>, _>>()
                .context("invalid CORS origin")?;
            CorsLayer::new().allow_origin(AllowOrigin::list(origins))
        }
        None => CorsLayer::permissive(),
    };

    let app = Router::new()
        .route("/", get(|| async { "kstores-api" }))
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match kstores_api::db::check_connection(&state.db).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "database unavailable"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
