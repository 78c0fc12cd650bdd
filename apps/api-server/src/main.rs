//! # Chapel API Server
//!
//! HTTP API for the counseling center's information board: public post reads,
//! admin-only writes behind a cookie session, and image uploads.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::LogFormat;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(LogFormat::from_env());

    let config = AppConfig::from_env();
    tracing::info!(
        environment = ?config.environment,
        "Starting Chapel API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::build(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        std::io::Error::other(e.to_string())
    })?;

    #[cfg(feature = "scheduler")]
    let purge =
        background::start_session_purge(state.session_store.clone(), config.scheduler.clone())
            .await
            .map_err(|e| std::io::Error::other(format!("Scheduler: {e}")))?;
    #[cfg(not(feature = "scheduler"))]
    if config.scheduler.enabled {
        tracing::warn!("Built without the scheduler feature; purging expired sessions once");
        background::purge_expired_sessions(state.session_store.as_ref()).await;
    }

    let origins = config.allowed_origins.clone();
    let result = HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Some(purge) = purge {
        if let Err(e) = purge.shutdown().await {
            tracing::warn!(error = %e, "Scheduler shutdown failed");
        }
    }

    result
}
