pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod http;
pub mod middleware;
pub mod models;
pub mod state;

use std::{error::Error, net::SocketAddr, sync::Arc};

use axum::{Router, middleware as axum_middleware};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use config::{Config, ConfigError};
use db::{MemoryDirectory, MemoryRatingStore, PgStorage, Seed};
use middleware::{cors_layer, create_rate_limiter, rate_limit_middleware};
use state::AppState;

/// Builds the full application router with its middleware stack.
pub fn app(state: AppState, config: &Config) -> Router {
    let rate_limiter = create_rate_limiter(config.rate_limit_per_minute);

    Router::new()
        .merge(http::create_http_routes(state))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(rate_limiter.clone(), req, next)
        }))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { "404 Not Found" })
}

async fn build_state(config: &Config) -> Result<AppState, Box<dyn Error + Send + Sync>> {
    let state = match &config.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let storage = Arc::new(PgStorage::connect(url, config.max_connections).await?);
            AppState::new(
                storage.clone(),
                storage,
                config.policy,
                &config.jwt_secret,
            )
        }
        None => {
            // An empty directory would reject every token, so memory mode needs a seed.
            let path = config
                .seed_file
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL or SEED_FILE"))?;
            warn!("DATABASE_URL not set, keeping ratings in memory");

            let directory = MemoryDirectory::new();
            directory.seed(&Seed::load(path).await?).await?;
            AppState::new(
                Arc::new(MemoryRatingStore::new()),
                Arc::new(directory),
                config.policy,
                &config.jwt_secret,
            )
        }
    };
    Ok(state)
}

pub async fn start_server() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config).await?;
    let app = app(state, &config);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Store ratings server running on {address}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::Directory, models::Role};

    fn config_with(seed_file: Option<String>) -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("s3cret".into()),
            "SEED_FILE" => seed_file.clone(),
            _ => None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn memory_mode_requires_a_seed() {
        let err = build_state(&config_with(None)).await.err().unwrap();
        assert_eq!(err.to_string(), "DATABASE_URL or SEED_FILE must be set");
    }

    #[tokio::test]
    async fn memory_mode_serves_seeded_accounts() {
        let path = std::env::temp_dir().join(format!("store-ratings-seed-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "users": [{ "name": "Admin Person", "email": "admin@example.com", "role": "admin" }] }"#,
        )
        .unwrap();

        let state = build_state(&config_with(Some(path.display().to_string())))
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        let admin = state.directory.user(1).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn unreadable_seed_file_fails_startup() {
        let missing = std::env::temp_dir().join("store-ratings-no-such-seed.json");
        let result = build_state(&config_with(Some(missing.display().to_string()))).await;
        assert!(result.is_err());
    }
}
